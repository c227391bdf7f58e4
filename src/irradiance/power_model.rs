use crate::config::EnvironmentParameters;

/// Instantaneous panel output in W for a given irradiance in W/m².
///
/// Kept at full precision; only the log formatting rounds it.
pub fn solar_power(irradiance: f64, area: f64, efficiency: f64, performance_ratio: f64) -> f64 {
    irradiance * area * efficiency * performance_ratio
}

/// [`solar_power`] with the panel parameters of `env`.
pub fn panel_power(env: &EnvironmentParameters, irradiance: f64) -> f64 {
    solar_power(irradiance, env.panel_area, env.panel_efficiency, env.performance_ratio)
}
