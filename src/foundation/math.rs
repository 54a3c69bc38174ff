/// Round a channel value computed in float space back to `u8`.
///
/// Rounds half away from zero, then clamps to `[0, 255]`. Every blend and interpolation path
/// goes through this so the rounding rule is the same everywhere.
pub(crate) fn round_channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

pub(crate) fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let a = f64::from(a);
    let b = f64::from(b);
    round_channel(a + (b - a) * t)
}

pub(crate) fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
