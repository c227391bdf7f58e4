use crate::util::round_to;
use nalgebra::UnitQuaternion;
use strum_macros::{Display, EnumString};

/// How the IMU is mounted relative to the solar panel, i.e. which attitude angle
/// becomes the panel tilt `beta`. The panel azimuth `gamma_c` is always the yaw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PanelMounting {
    /// IMU forward axis along the panel's tilt axis: tilt is the pitch. Roll is ignored.
    PitchYaw,
    /// IMU mounted a quarter turn around the vertical: tilt is the roll. Pitch is ignored.
    RollYaw,
    /// Tilt is the angle between the panel normal and the vertical, so roll and pitch
    /// both contribute: `acos(cos(roll) * cos(pitch))`.
    CombinedTilt,
}

/// Roll, pitch and yaw in degrees, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Panel tilt `beta` and azimuth `gamma_c` in degrees, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelAngles {
    pub beta: f64,
    pub gamma_c: f64,
}

/// Converts IMU orientations into attitude and panel angles.
///
/// Angles follow the aerospace Tait-Bryan convention `R = Rz(yaw) * Ry(pitch) * Rx(roll)`:
/// roll about the forward axis, pitch about the lateral axis, yaw about the vertical axis.
#[derive(Debug, Clone, Copy)]
pub struct AttitudeDecoder {
    mounting: PanelMounting,
}

impl AttitudeDecoder {
    const ANGLE_DECIMALS: i32 = 2;

    pub fn new(mounting: PanelMounting) -> Self { Self { mounting } }

    pub fn mounting(&self) -> PanelMounting { self.mounting }

    pub fn decode(orientation: &UnitQuaternion<f64>) -> AttitudeAngles {
        let (roll, pitch, yaw) = orientation.euler_angles();
        AttitudeAngles {
            roll: Self::to_deg_rounded(roll),
            pitch: Self::to_deg_rounded(pitch),
            yaw: Self::to_deg_rounded(yaw),
        }
    }

    /// Derives the panel angles for the configured mounting.
    ///
    /// Rounding is applied once, to the final angles, so the combined tilt is computed
    /// from the unrounded attitude.
    pub fn panel_angles(&self, orientation: &UnitQuaternion<f64>) -> PanelAngles {
        let (roll, pitch, yaw) = orientation.euler_angles();
        let tilt = match self.mounting {
            PanelMounting::PitchYaw => pitch,
            PanelMounting::RollYaw => roll,
            PanelMounting::CombinedTilt => (roll.cos() * pitch.cos()).clamp(-1.0, 1.0).acos(),
        };
        PanelAngles { beta: Self::to_deg_rounded(tilt), gamma_c: Self::to_deg_rounded(yaw) }
    }

    fn to_deg_rounded(rad: f64) -> f64 { round_to(rad.to_degrees(), Self::ANGLE_DECIMALS) }
}

impl Default for AttitudeDecoder {
    fn default() -> Self { Self::new(PanelMounting::PitchYaw) }
}
