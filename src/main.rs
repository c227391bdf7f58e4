#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod console;
mod irradiance;
mod record;
mod sensor;
mod sim_control;
mod util;

use crate::config::SimConfig;
use crate::console::KeyWatcher;
use crate::irradiance::{OracleWorker, ProcessOracle};
use crate::record::CsvRecordSink;
use crate::sensor::{AttitudeDecoder, ImuFeed};
use crate::sim_control::LoopController;
use std::{process::ExitCode, sync::Arc};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let config = SimConfig::from_env().unwrap_or_else(|e| fatal!("Invalid configuration: {e}"));
    let env = *config.env();
    log!(
        "Scenario Ls={} phi={} longitude={} tau={}, panel {}m² at {} efficiency and {} performance ratio.",
        env.ls,
        env.phi,
        env.longitude,
        env.tau,
        env.panel_area,
        env.panel_efficiency,
        env.performance_ratio
    );

    let c_tok = CancellationToken::new();
    let (source, feed_handle) = ImuFeed::connect(config.imu_addr(), c_tok.child_token())
        .await
        .unwrap_or_else(|e| fatal!("{e}"));
    let sink = CsvRecordSink::open(config.record_path(), config.sink_mode())
        .unwrap_or_else(|e| fatal!("Could not open record log: {e}"));
    let last_logged_step = sink.last_step();

    let oracle = ProcessOracle::new(config.oracle_program(), config.oracle_args());
    log!(
        "Irradiance model: {} (timeout {}ms).",
        oracle.command_line(),
        config.oracle_timeout().as_millis()
    );
    let (worker, worker_handle) =
        OracleWorker::spawn(Arc::new(oracle), config.oracle_timeout(), c_tok.child_token());

    let key_handle = KeyWatcher::spawn_stdin(c_tok.clone());
    let c_tok_local = c_tok.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping.");
            c_tok_local.cancel();
        }
    });

    let controller = LoopController::new(
        env,
        source,
        sink,
        worker,
        AttitudeDecoder::new(config.mounting()),
        config.step_policy(),
        c_tok.clone(),
    )
    .resume_after(last_logged_step);
    let res = controller.run().await;

    c_tok.cancel();
    feed_handle.await.ok();
    worker_handle.await.ok();
    if let Some(handle) = key_handle {
        handle.join().ok();
    }

    match res {
        Ok(summary) => {
            info!("Record log {} holds steps up to {:?}.", config.record_path().display(), summary.last_step);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Simulation aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
