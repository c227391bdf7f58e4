use super::oracle::{IrradianceOracle, IrradianceQuery, OracleError};
use crate::util::round_to;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

struct OracleJob {
    query: IrradianceQuery,
    reply: oneshot::Sender<Result<f64, OracleError>>,
}

/// Single-slot worker running irradiance model calls off the control loop.
///
/// At most one call runs at a time and at most one more waits in the queue. Each call is
/// bounded by the configured timeout; an expired or cancelled call drops the oracle
/// future, which kills a child process still running.
pub struct OracleWorker {
    tx: mpsc::Sender<OracleJob>,
}

impl OracleWorker {
    const QUEUE_DEPTH: usize = 1;
    const IRRADIANCE_DECIMALS: i32 = 2;

    /// Spawns the worker task.
    ///
    /// # Arguments
    /// - `oracle`: The model implementation to call.
    /// - `timeout`: Upper bound for a single call.
    /// - `c_tok`: Stops the worker, abandoning a call in progress.
    ///
    /// # Returns
    /// - The handle used to submit queries and the `JoinHandle` of the worker task.
    pub fn spawn(
        oracle: Arc<dyn IrradianceOracle>,
        timeout: Duration,
        c_tok: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(Self::QUEUE_DEPTH);
        let handle = tokio::spawn(Self::run(oracle, rx, timeout, c_tok));
        (Self { tx }, handle)
    }

    async fn run(
        oracle: Arc<dyn IrradianceOracle>,
        mut rx: mpsc::Receiver<OracleJob>,
        timeout: Duration,
        c_tok: CancellationToken,
    ) {
        loop {
            let job = tokio::select! {
                job = rx.recv() => job,
                () = c_tok.cancelled() => None,
            };
            let Some(job) = job else { break };
            let res = tokio::select! {
                res = tokio::time::timeout(timeout, oracle.global_irradiance(&job.query)) => {
                    res.unwrap_or_else(|_| Err(OracleError::Timeout(timeout)))
                }
                () = c_tok.cancelled() => break,
            };
            // The caller may have given up waiting already.
            job.reply.send(res).ok();
        }
    }

    /// Submits `query` and waits for the irradiance, rounded to two decimals.
    pub async fn compute_irradiance(&self, query: IrradianceQuery) -> Result<f64, OracleError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(OracleJob { query, reply }).await.map_err(|_| OracleError::WorkerGone)?;
        let irradiance = rx.await.map_err(|_| OracleError::WorkerGone)??;
        Ok(round_to(irradiance, Self::IRRADIANCE_DECIMALS))
    }
}
