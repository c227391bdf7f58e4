use super::loop_state::{LoopState, RunSummary, SimError, StepPolicy, TickOutcome};
use super::sim_clock::SimulationClock;
use crate::config::EnvironmentParameters;
use crate::irradiance::{IrradianceQuery, OracleError, OracleWorker, panel_power};
use crate::record::{RecordSink, SimulationRecord};
use crate::sensor::{AttitudeDecoder, OrientationSource};
use crate::{event, info, rec, warn};
use tokio_util::sync::CancellationToken;

/// Drives the sampling loop: poll orientation, derive panel angles and solar time, ask the
/// irradiance model, compute power and append one record per successful tick.
///
/// The controller owns all mutable loop state (clock, step counter, sink), so every run
/// starts from a fresh instance.
pub struct LoopController<S: OrientationSource, K: RecordSink> {
    env: EnvironmentParameters,
    source: S,
    sink: K,
    oracle: OracleWorker,
    decoder: AttitudeDecoder,
    clock: SimulationClock,
    state: LoopState,
    next_step: u64,
    step_policy: StepPolicy,
    c_tok: CancellationToken,
    summary: RunSummary,
}

impl<S: OrientationSource, K: RecordSink> LoopController<S, K> {
    const FIRST_STEP: u64 = 1;

    pub fn new(
        env: EnvironmentParameters,
        source: S,
        sink: K,
        oracle: OracleWorker,
        decoder: AttitudeDecoder,
        step_policy: StepPolicy,
        c_tok: CancellationToken,
    ) -> Self {
        Self {
            clock: SimulationClock::new(env.t_local_start),
            env,
            source,
            sink,
            oracle,
            decoder,
            state: LoopState::AwaitingFirstSample,
            next_step: Self::FIRST_STEP,
            step_policy,
            c_tok,
            summary: RunSummary::default(),
        }
    }

    /// Continues the step numbering of an earlier run whose last logged step was
    /// `last_step`. `None` starts at step 1.
    #[must_use]
    pub fn resume_after(mut self, last_step: Option<u64>) -> Self {
        self.next_step = last_step.map_or(Self::FIRST_STEP, |step| step.saturating_add(1));
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState { self.state }
    #[cfg(test)]
    pub fn clock(&self) -> &SimulationClock { &self.clock }
    #[cfg(test)]
    pub fn next_step(&self) -> u64 { self.next_step }
    #[cfg(test)]
    pub fn summary(&self) -> RunSummary { self.summary }

    /// Ticks until cancelled or a fatal error occurs, sleeping one poll interval between
    /// ticks. The sink is closed and the source released on every exit path.
    ///
    /// # Returns
    /// - The run's `RunSummary` after a cancellation.
    /// - `SimError` if the sink failed or the irradiance worker died.
    pub async fn run(mut self) -> Result<RunSummary, SimError> {
        info!(
            "Simulation loop started at step {}: poll interval {}ms, step policy {}, mounting {}.",
            self.next_step,
            self.env.poll_interval.as_millis(),
            self.step_policy,
            self.decoder.mounting()
        );
        let res = self.run_ticks().await;
        self.state = LoopState::Stopped;
        let closed = self.sink.close();
        let s = self.summary;
        info!(
            "Simulation loop stopped after {} records ({} model failures, {} empty polls, {} clock anomalies).",
            s.records, s.oracle_failures, s.absent_polls, s.clock_anomalies
        );
        res?;
        closed?;
        Ok(s)
    }

    async fn run_ticks(&mut self) -> Result<(), SimError> {
        loop {
            if self.tick().await? == TickOutcome::Stopped {
                return Ok(());
            }
            if tokio::time::timeout(self.env.poll_interval, self.c_tok.cancelled()).await.is_ok() {
                self.state = LoopState::Stopped;
                return Ok(());
            }
        }
    }

    /// Performs one iteration. Polls the source exactly once and never waits for data.
    pub async fn tick(&mut self) -> Result<TickOutcome, SimError> {
        if self.state == LoopState::Stopped || self.c_tok.is_cancelled() {
            self.state = LoopState::Stopped;
            return Ok(TickOutcome::Stopped);
        }
        let Some(sample) = self.source.try_read_latest() else {
            self.summary.absent_polls += 1;
            event!("No new orientation sample while {}.", self.state);
            return Ok(TickOutcome::NoSample);
        };
        if self.state == LoopState::AwaitingFirstSample {
            info!("First orientation sample at {}, simulation clock started.", sample.timestamp());
            self.state = LoopState::Running;
        }

        let elapsed = self.clock.observe(sample.timestamp());
        if elapsed.is_clamped() {
            self.summary.clock_anomalies += 1;
            warn!(
                "Sample time {} is older than an earlier sample, holding elapsed time at {}s!",
                sample.timestamp(),
                elapsed.elapsed_secs()
            );
        }
        let t_solar = self.clock.local_solar_time(&elapsed);
        let panel = self.decoder.panel_angles(sample.orientation());
        let attitude = AttitudeDecoder::decode(sample.orientation());
        event!(
            "Attitude roll={} pitch={} yaw={} -> beta={} gamma_c={}",
            attitude.roll,
            attitude.pitch,
            attitude.yaw,
            panel.beta,
            panel.gamma_c
        );
        let query = IrradianceQuery::new(&self.env, t_solar, panel);

        let step = self.next_step;
        let res = tokio::select! {
            biased;
            () = self.c_tok.cancelled() => None,
            res = self.oracle.compute_irradiance(query) => Some(res),
        };
        let Some(res) = res else {
            self.state = LoopState::Stopped;
            return Ok(TickOutcome::Stopped);
        };

        match res {
            Ok(irradiance) => {
                let power = panel_power(&self.env, irradiance);
                let record =
                    SimulationRecord::new(step, elapsed.elapsed_secs(), &query, irradiance, power);
                self.sink.append(&record)?;
                rec!(
                    "Step {step}: t={}s Ts={t_solar} beta={} gamma_c={} irradiance={irradiance} power={power:.2}W",
                    elapsed.elapsed_secs(),
                    panel.beta,
                    panel.gamma_c
                );
                self.summary.records += 1;
                self.summary.last_step = Some(step);
                self.next_step += 1;
                Ok(TickOutcome::Emitted(step))
            }
            Err(OracleError::WorkerGone) if self.c_tok.is_cancelled() => {
                self.state = LoopState::Stopped;
                Ok(TickOutcome::Stopped)
            }
            Err(OracleError::WorkerGone) => Err(SimError::Oracle(OracleError::WorkerGone)),
            Err(e) => {
                self.summary.oracle_failures += 1;
                warn!("Step {step}: irradiance model failed for {query}: {e}");
                if self.step_policy == StepPolicy::Consume {
                    self.next_step += 1;
                }
                Ok(TickOutcome::OracleFailed(step))
            }
        }
    }
}
