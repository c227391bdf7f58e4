use super::orientation_sample::OrientationSample;
use tokio::sync::watch;

/// Non-blocking access to the most recent orientation sample.
pub trait OrientationSource: Send {
    /// Returns the latest sample if one arrived since the previous call, `None` otherwise.
    ///
    /// Never blocks and never synthesizes a sample. Repeated calls without new data keep
    /// returning `None`; samples that were overwritten before being read are skipped.
    fn try_read_latest(&mut self) -> Option<OrientationSample>;
}

/// [`OrientationSource`] reading from a latest-value channel filled by a feed task.
pub struct LatestSampleSource {
    rx: watch::Receiver<Option<OrientationSample>>,
}

impl LatestSampleSource {
    /// Creates the publishing end and the matching source.
    pub fn channel() -> (watch::Sender<Option<OrientationSample>>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self { rx })
    }

    /// Returns `true` while the publishing feed is still alive.
    #[cfg(test)]
    pub fn is_connected(&self) -> bool { self.rx.has_changed().is_ok() }
}

impl OrientationSource for LatestSampleSource {
    fn try_read_latest(&mut self) -> Option<OrientationSample> {
        let fresh = match self.rx.has_changed() {
            Ok(fresh) => fresh,
            // The feed is gone, but the last value it published may still be unread.
            Err(_) => self.rx.borrow().has_changed(),
        };
        if fresh { *self.rx.borrow_and_update() } else { None }
    }
}
