use crate::irradiance::OracleError;
use crate::record::SinkError;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoopState {
    AwaitingFirstSample,
    Running,
    Stopped,
}

/// What a failed irradiance call does to the step counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StepPolicy {
    /// The failed tick uses up its step number; the log shows a gap.
    Consume,
    /// The next emitted record reuses the number of the failed tick.
    Hold,
}

/// Result of a single loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No new orientation sample was available.
    NoSample,
    /// A record with this step was appended.
    Emitted(u64),
    /// The irradiance model failed for the tick that held this step.
    OracleFailed(u64),
    /// Cancellation was observed; nothing was emitted.
    Stopped,
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub oracle_failures: u64,
    pub absent_polls: u64,
    pub clock_anomalies: u64,
    pub last_step: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("writing the record log failed: {0}")]
    Sink(#[from] SinkError),
    #[error("irradiance model unavailable: {0}")]
    Oracle(#[source] OracleError),
}
