use chrono::{DateTime, Utc};
use nalgebra::{Quaternion, UnitQuaternion};

/// A single timestamped IMU orientation, immutable once read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    timestamp: DateTime<Utc>,
    orientation: UnitQuaternion<f64>,
}

impl OrientationSample {
    pub fn new(timestamp: DateTime<Utc>, orientation: UnitQuaternion<f64>) -> Self {
        Self { timestamp, orientation }
    }

    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn orientation(&self) -> &UnitQuaternion<f64> { &self.orientation }
}

/// Orientation as it arrives on the IMU feed: real part and imaginary vector.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawOrientationSample {
    pub time: DateTime<Utc>,
    pub re: f64,
    pub im: [f64; 3],
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SampleError {
    #[error("quaternion component is not finite")]
    NotFinite,
    #[error("quaternion norm {0} is too small to normalize")]
    Degenerate(f64),
}

impl RawOrientationSample {
    const MIN_NORM: f64 = 1e-6;
}

impl TryFrom<RawOrientationSample> for OrientationSample {
    type Error = SampleError;

    fn try_from(raw: RawOrientationSample) -> Result<Self, Self::Error> {
        let [i, j, k] = raw.im;
        let q = Quaternion::new(raw.re, i, j, k);
        if !q.coords.iter().all(|c| c.is_finite()) {
            return Err(SampleError::NotFinite);
        }
        let norm = q.norm();
        if norm < RawOrientationSample::MIN_NORM {
            return Err(SampleError::Degenerate(norm));
        }
        Ok(OrientationSample::new(raw.time, UnitQuaternion::from_quaternion(q)))
    }
}
