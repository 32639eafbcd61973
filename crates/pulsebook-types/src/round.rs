//! Half-up rounding for metric values.

/// Round to the nearest integer, with halves rounding toward positive infinity.
///
/// This differs from [`f64::round`] only for negative halves:
/// `-2.5` becomes `-2.0` here and `-3.0` there.
///
/// ```
/// use pulsebook_types::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3.0);
/// assert_eq!(round_half_up(-2.5), -2.0);
/// assert_eq!(round_half_up(236.588), 237.0);
/// ```
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Round to `decimals` places using [`round_half_up`].
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    round_half_up(value * scale) / scale
}
