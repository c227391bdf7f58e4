use crate::irradiance::IrradianceQuery;

/// Column order of the record log.
pub const RECORD_HEADER: [&str; 11] = [
    "step",
    "t_elapsed",
    "Ls",
    "phi",
    "longitude",
    "tau",
    "Ts",
    "beta",
    "gamma_c",
    "irradiance",
    "power",
];

/// One row of the simulation time series. Field order is the column order.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SimulationRecord {
    step: u64,
    t_elapsed: f64,
    #[serde(rename = "Ls")]
    ls: f64,
    phi: f64,
    longitude: f64,
    tau: f64,
    #[serde(rename = "Ts")]
    t_solar: f64,
    beta: f64,
    gamma_c: f64,
    irradiance: f64,
    power: f64,
}

impl SimulationRecord {
    /// Builds a record from the inputs that were handed to the irradiance model and its
    /// results.
    pub fn new(
        step: u64,
        t_elapsed: f64,
        query: &IrradianceQuery,
        irradiance: f64,
        power: f64,
    ) -> Self {
        Self {
            step,
            t_elapsed,
            ls: query.ls,
            phi: query.phi,
            longitude: query.longitude,
            tau: query.tau,
            t_solar: query.t_solar,
            beta: query.beta,
            gamma_c: query.gamma_c,
            irradiance,
            power,
        }
    }

    pub fn step(&self) -> u64 { self.step }
    #[cfg(test)]
    pub fn t_elapsed(&self) -> f64 { self.t_elapsed }
    #[cfg(test)]
    pub fn t_solar(&self) -> f64 { self.t_solar }
    #[cfg(test)]
    pub fn beta(&self) -> f64 { self.beta }
    #[cfg(test)]
    pub fn gamma_c(&self) -> f64 { self.gamma_c }
    #[cfg(test)]
    pub fn irradiance(&self) -> f64 { self.irradiance }
    #[cfg(test)]
    pub fn power(&self) -> f64 { self.power }
}
