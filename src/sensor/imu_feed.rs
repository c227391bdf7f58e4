use super::orientation_sample::{OrientationSample, RawOrientationSample, SampleError};
use super::orientation_source::LatestSampleSource;
use crate::{error, event, info, warn};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    net::TcpStream,
    sync::watch,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("could not connect to IMU feed at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IMU feed at {0} did not accept a connection within {1:?}")]
    ConnectTimeout(String, Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("malformed sample: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid orientation: {0}")]
    Sample(#[from] SampleError),
}

/// Why a feed pump returned.
#[derive(Debug)]
pub enum FeedEnd {
    Cancelled,
    Closed,
    Failed(std::io::Error),
}

/// TCP client for the rover's IMU orientation stream.
///
/// The stream carries one JSON object per line, `{"time": <RFC 3339>, "re": w, "im": [x, y, z]}`.
/// Every valid line replaces the value behind the returned [`LatestSampleSource`].
pub struct ImuFeed;

impl ImuFeed {
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connects to the feed and spawns the task pumping its lines into a latest-value channel.
    ///
    /// # Arguments
    /// - `addr`: `host:port` of the IMU feed.
    /// - `c_tok`: Stops the pump task when cancelled.
    ///
    /// # Returns
    /// - The source to poll and the handle of the pump task, or a `FeedError` if the feed
    ///   cannot be reached.
    pub async fn connect(
        addr: &str,
        c_tok: CancellationToken,
    ) -> Result<(LatestSampleSource, JoinHandle<()>), FeedError> {
        let stream = match tokio::time::timeout(Self::CONNECT_TIMEOUT, TcpStream::connect(addr)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(FeedError::Connect { addr: addr.to_string(), source }),
            Err(_) => {
                return Err(FeedError::ConnectTimeout(addr.to_string(), Self::CONNECT_TIMEOUT));
            }
        };
        info!("Connected to IMU feed at {addr}.");
        let (tx, source) = LatestSampleSource::channel();
        let addr_local = addr.to_string();
        let handle = tokio::spawn(async move {
            match Self::pump(stream, &tx, c_tok).await {
                FeedEnd::Cancelled => event!("IMU feed pump stopped."),
                FeedEnd::Closed => warn!("IMU feed at {addr_local} closed the connection!"),
                FeedEnd::Failed(e) => error!("IMU feed at {addr_local} failed: {e}"),
            }
        });
        Ok((source, handle))
    }

    /// Reads sample lines until the reader ends or `c_tok` is cancelled.
    ///
    /// Malformed lines and samples not newer than the last published one are dropped.
    pub async fn pump<R: AsyncRead + Unpin>(
        reader: R,
        tx: &watch::Sender<Option<OrientationSample>>,
        c_tok: CancellationToken,
    ) -> FeedEnd {
        let mut lines = BufReader::new(reader).lines();
        let mut last_t: Option<DateTime<Utc>> = None;
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line,
                () = c_tok.cancelled() => return FeedEnd::Cancelled,
            };
            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => return FeedEnd::Closed,
                Err(e) => return FeedEnd::Failed(e),
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_sample_line(&line) {
                Ok(sample) => {
                    if last_t.is_some_and(|t| sample.timestamp() <= t) {
                        event!("Dropping stale IMU sample from {}.", sample.timestamp());
                        continue;
                    }
                    last_t = Some(sample.timestamp());
                    tx.send_replace(Some(sample));
                }
                Err(e) => warn!("Dropping IMU line {line:?}: {e}"),
            }
        }
    }
}

/// Parses one feed line into a validated sample.
pub fn parse_sample_line(line: &str) -> Result<OrientationSample, LineError> {
    let raw: RawOrientationSample = serde_json::from_str(line)?;
    Ok(OrientationSample::try_from(raw)?)
}
