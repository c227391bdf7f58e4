mod oracle;
mod oracle_worker;
mod power_model;
mod process_oracle;

pub use oracle::{IrradianceQuery, OracleError};
pub use oracle_worker::OracleWorker;
pub use power_model::panel_power;
pub use process_oracle::ProcessOracle;

#[cfg(test)]
pub use oracle::{IrradianceOracle, parse_irradiance};
#[cfg(test)]
pub use power_model::solar_power;
