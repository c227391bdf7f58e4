use std::time::Duration;

/// Fixed simulation parameters, set once at startup and read-only for the whole run.
///
/// The defaults reproduce the Ismenus Cavus scenario the rover campaign was planned for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentParameters {
    /// Areocentric longitude `Ls` in degrees.
    pub ls: f64,
    /// Planetary latitude in degrees.
    pub phi: f64,
    /// Planetary longitude in degrees.
    pub longitude: f64,
    /// Atmospheric optical opacity.
    pub tau: f64,
    /// Panel area in square meters.
    pub panel_area: f64,
    /// Solar cell efficiency.
    pub panel_efficiency: f64,
    /// Empirical derating between theoretical and delivered output.
    pub performance_ratio: f64,
    /// Local solar time in hours at the first valid sample.
    pub t_local_start: f64,
    /// Sleep time between two loop iterations.
    pub poll_interval: Duration,
}

impl EnvironmentParameters {
    pub const DEF_LS: f64 = 81.0;
    pub const DEF_PHI: f64 = 34.0;
    pub const DEF_LONGITUDE: f64 = 17.0;
    pub const DEF_TAU: f64 = 0.5;
    /// Ismenus Cavus: 2.4 m², Iani Chaos: 1.5 m².
    pub const DEF_PANEL_AREA: f64 = 2.4;
    pub const DEF_PANEL_EFFICIENCY: f64 = 0.22;
    pub const DEF_PERFORMANCE_RATIO: f64 = 0.62;
    pub const DEF_T_LOCAL_START: f64 = 12.0;
    pub const DEF_POLL_MS: u64 = 100;
    pub const DEF_POLL_INTERVAL: Duration = Duration::from_millis(Self::DEF_POLL_MS);
}

impl Default for EnvironmentParameters {
    fn default() -> Self {
        Self {
            ls: Self::DEF_LS,
            phi: Self::DEF_PHI,
            longitude: Self::DEF_LONGITUDE,
            tau: Self::DEF_TAU,
            panel_area: Self::DEF_PANEL_AREA,
            panel_efficiency: Self::DEF_PANEL_EFFICIENCY,
            performance_ratio: Self::DEF_PERFORMANCE_RATIO,
            t_local_start: Self::DEF_T_LOCAL_START,
            poll_interval: Self::DEF_POLL_INTERVAL,
        }
    }
}
