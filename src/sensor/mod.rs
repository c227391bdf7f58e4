mod attitude;
mod imu_feed;
mod orientation_sample;
mod orientation_source;
#[cfg(test)]
mod tests;

pub use attitude::{AttitudeDecoder, PanelAngles, PanelMounting};
pub use imu_feed::ImuFeed;
pub use orientation_source::OrientationSource;

#[cfg(test)]
pub use attitude::AttitudeAngles;
#[cfg(test)]
pub use imu_feed::{FeedEnd, FeedError, LineError, parse_sample_line};
#[cfg(test)]
pub use orientation_sample::{OrientationSample, RawOrientationSample, SampleError};
#[cfg(test)]
pub use orientation_source::LatestSampleSource;
