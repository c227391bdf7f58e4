use super::environment::EnvironmentParameters;
use crate::record::SinkMode;
use crate::sensor::PanelMounting;
use crate::sim_control::StepPolicy;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} could not be parsed")]
    Unparsable { key: &'static str, value: String },
    #[error("{key} is out of range: {reason}")]
    OutOfRange { key: &'static str, reason: &'static str },
    #[error("SIM_ORACLE_CMD does not name a program")]
    EmptyOracleCommand,
}

/// Complete startup configuration: the fixed simulation environment plus the
/// endpoints and policies of the surrounding plumbing.
///
/// Every field has a default and can be overridden through a `SIM_*` environment
/// variable. Nothing is reconfigured once the loop is running.
#[derive(Debug, Clone)]
pub struct SimConfig {
    env: EnvironmentParameters,
    /// Program followed by its leading arguments; the seven oracle inputs are appended.
    oracle_cmd: Vec<String>,
    oracle_timeout: Duration,
    imu_addr: String,
    record_path: PathBuf,
    sink_mode: SinkMode,
    step_policy: StepPolicy,
    mounting: PanelMounting,
}

impl SimConfig {
    pub const DEF_ORACLE_CMD: &'static str = "Rscript --vanilla irradiance.R";
    pub const DEF_ORACLE_TIMEOUT_MS: u64 = 2000;
    pub const DEF_IMU_ADDR: &'static str = "127.0.0.1:5555";
    pub const DEF_RECORD_PATH: &'static str = "data.csv";
    /// Poll intervals a single tick may take at most. The oracle timeout has to fit
    /// inside this budget.
    pub const TICK_BUDGET_POLLS: u32 = 25;

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| env::var(key).ok()) }

    /// Builds and validates a configuration from an arbitrary key lookup.
    ///
    /// # Arguments
    /// - `lookup`: Returns the raw value for a variable name, or `None` to use the default.
    ///
    /// # Returns
    /// - The validated `SimConfig`, or the first `ConfigError` encountered.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        type Env = EnvironmentParameters;
        let env = EnvironmentParameters {
            ls: parse_or(&lookup, "SIM_LS", Env::DEF_LS)?,
            phi: parse_or(&lookup, "SIM_PHI", Env::DEF_PHI)?,
            longitude: parse_or(&lookup, "SIM_LONGITUDE", Env::DEF_LONGITUDE)?,
            tau: parse_or(&lookup, "SIM_TAU", Env::DEF_TAU)?,
            panel_area: parse_or(&lookup, "SIM_PANEL_AREA", Env::DEF_PANEL_AREA)?,
            panel_efficiency: parse_or(&lookup, "SIM_PANEL_EFFICIENCY", Env::DEF_PANEL_EFFICIENCY)?,
            performance_ratio: parse_or(
                &lookup,
                "SIM_PERFORMANCE_RATIO",
                Env::DEF_PERFORMANCE_RATIO,
            )?,
            t_local_start: parse_or(&lookup, "SIM_T_START", Env::DEF_T_LOCAL_START)?,
            poll_interval: Duration::from_millis(parse_or(&lookup, "SIM_POLL_MS", Env::DEF_POLL_MS)?),
        };
        let oracle_cmd = lookup("SIM_ORACLE_CMD")
            .unwrap_or_else(|| Self::DEF_ORACLE_CMD.to_string())
            .split_whitespace()
            .map(String::from)
            .collect();
        let config = Self {
            env,
            oracle_cmd,
            oracle_timeout: Duration::from_millis(parse_or(
                &lookup,
                "SIM_ORACLE_TIMEOUT_MS",
                Self::DEF_ORACLE_TIMEOUT_MS,
            )?),
            imu_addr: lookup("SIM_IMU_ADDR").unwrap_or_else(|| Self::DEF_IMU_ADDR.to_string()),
            record_path: lookup("SIM_RECORD_PATH")
                .map_or_else(|| PathBuf::from(Self::DEF_RECORD_PATH), PathBuf::from),
            sink_mode: parse_or(&lookup, "SIM_SINK_MODE", SinkMode::Append)?,
            step_policy: parse_or(&lookup, "SIM_STEP_POLICY", StepPolicy::Consume)?,
            mounting: parse_or(&lookup, "SIM_PANEL_MOUNTING", PanelMounting::PitchYaw)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.env;
        let finite = [
            ("SIM_LS", e.ls),
            ("SIM_PHI", e.phi),
            ("SIM_LONGITUDE", e.longitude),
            ("SIM_TAU", e.tau),
            ("SIM_PANEL_AREA", e.panel_area),
            ("SIM_PANEL_EFFICIENCY", e.panel_efficiency),
            ("SIM_PERFORMANCE_RATIO", e.performance_ratio),
            ("SIM_T_START", e.t_local_start),
        ];
        if let Some((key, _)) = finite.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::OutOfRange { key, reason: "must be a finite number" });
        }
        if e.tau < 0.0 {
            return Err(ConfigError::OutOfRange { key: "SIM_TAU", reason: "must not be negative" });
        }
        if e.panel_area <= 0.0 {
            return Err(ConfigError::OutOfRange { key: "SIM_PANEL_AREA", reason: "must be positive" });
        }
        for (key, ratio) in [
            ("SIM_PANEL_EFFICIENCY", e.panel_efficiency),
            ("SIM_PERFORMANCE_RATIO", e.performance_ratio),
        ] {
            if ratio <= 0.0 || ratio > 1.0 {
                return Err(ConfigError::OutOfRange { key, reason: "must be in (0, 1]" });
            }
        }
        if e.poll_interval.is_zero() {
            return Err(ConfigError::OutOfRange { key: "SIM_POLL_MS", reason: "must be positive" });
        }
        if self.oracle_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                key: "SIM_ORACLE_TIMEOUT_MS",
                reason: "must be positive",
            });
        }
        if self.oracle_timeout >= self.tick_budget() {
            return Err(ConfigError::OutOfRange {
                key: "SIM_ORACLE_TIMEOUT_MS",
                reason: "must be shorter than the tick budget of 25 poll intervals",
            });
        }
        if self.oracle_cmd.is_empty() {
            return Err(ConfigError::EmptyOracleCommand);
        }
        Ok(())
    }

    pub fn env(&self) -> &EnvironmentParameters { &self.env }
    pub fn oracle_program(&self) -> &str { &self.oracle_cmd[0] }
    pub fn oracle_args(&self) -> &[String] { &self.oracle_cmd[1..] }
    /// Upper bound for one irradiance model call, strictly shorter than
    /// [`Self::tick_budget`]. A slow call only delays its own tick; cancellation races
    /// the call and never waits for it.
    pub fn oracle_timeout(&self) -> Duration { self.oracle_timeout }
    /// Longest a tick may run before the loop counts as stalled.
    pub fn tick_budget(&self) -> Duration { self.env.poll_interval * Self::TICK_BUDGET_POLLS }
    pub fn imu_addr(&self) -> &str { &self.imu_addr }
    pub fn record_path(&self) -> &PathBuf { &self.record_path }
    pub fn sink_mode(&self) -> SinkMode { self.sink_mode }
    pub fn step_policy(&self) -> StepPolicy { self.step_policy }
    pub fn mounting(&self) -> PanelMounting { self.mounting }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Unparsable { key, value: raw }),
    }
}
