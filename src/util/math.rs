/// Rounds `value` to `decimals` places, half away from zero.
///
/// A result of negative zero is returned as positive zero so it never shows up as `-0`
/// in the record log.
///
/// # Arguments
/// - `value`: The value to round.
/// - `decimals`: The number of decimal places to keep.
///
/// # Returns
/// - The rounded `f64`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Converts a `TimeDelta` to fractional seconds with millisecond resolution.
#[allow(clippy::cast_precision_loss)]
pub fn delta_secs(dt: chrono::TimeDelta) -> f64 { dt.num_milliseconds() as f64 / 1000.0 }
