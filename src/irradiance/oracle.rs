use crate::config::EnvironmentParameters;
use crate::sensor::PanelAngles;
use async_trait::async_trait;
use std::{fmt, process::ExitStatus, time::Duration};

/// The seven positional inputs of one irradiance model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceQuery {
    pub ls: f64,
    pub phi: f64,
    pub longitude: f64,
    pub tau: f64,
    pub t_solar: f64,
    pub beta: f64,
    pub gamma_c: f64,
}

impl IrradianceQuery {
    pub fn new(env: &EnvironmentParameters, t_solar: f64, panel: PanelAngles) -> Self {
        Self {
            ls: env.ls,
            phi: env.phi,
            longitude: env.longitude,
            tau: env.tau,
            t_solar,
            beta: panel.beta,
            gamma_c: panel.gamma_c,
        }
    }

    /// Positional arguments in model order. `f64`'s `Display` is the shortest string that
    /// parses back to the same value, so nothing is truncated.
    pub fn to_args(&self) -> [String; 7] {
        [self.ls, self.phi, self.longitude, self.tau, self.t_solar, self.beta, self.gamma_c]
            .map(|v| v.to_string())
    }
}

impl fmt::Display for IrradianceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ls={} phi={} longitude={} tau={} Ts={} beta={} gamma_c={}",
            self.ls, self.phi, self.longitude, self.tau, self.t_solar, self.beta, self.gamma_c
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("could not launch irradiance model: {0}")]
    Launch(#[source] std::io::Error),
    #[error("irradiance model exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
    #[error("irradiance model returned malformed output {0:?}")]
    Malformed(String),
    #[error("irradiance model did not answer within {0:?}")]
    Timeout(Duration),
    #[error("irradiance worker is no longer running")]
    WorkerGone,
}

/// External model computing the global irradiance on a tilted panel.
#[async_trait]
pub trait IrradianceOracle: Send + Sync {
    /// Computes the irradiance in W/m² for `query`. Implementations need not round or
    /// bound their own runtime; the worker does both.
    async fn global_irradiance(&self, query: &IrradianceQuery) -> Result<f64, OracleError>;
}

/// Extracts the irradiance from model output: exactly one non-empty line holding a
/// finite number.
pub fn parse_irradiance(stdout: &str) -> Result<f64, OracleError> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(line), None) => match line.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(OracleError::Malformed(stdout.to_string())),
        },
        _ => Err(OracleError::Malformed(stdout.to_string())),
    }
}
