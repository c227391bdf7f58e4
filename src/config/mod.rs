mod environment;
mod sim_config;

pub use environment::EnvironmentParameters;
pub use sim_config::SimConfig;

#[cfg(test)]
pub use sim_config::ConfigError;
