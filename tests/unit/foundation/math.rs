use super::*;

#[test]
fn round_channel_rounds_half_up_and_clamps() {
    assert_eq!(round_channel(127.5), 128);
    assert_eq!(round_channel(127.49), 127);
    assert_eq!(round_channel(-3.0), 0);
    assert_eq!(round_channel(300.0), 255);
    assert_eq!(round_channel(f64::NAN), 0);
}

#[test]
fn lerp_u8_endpoints() {
    assert_eq!(lerp_u8(10, 200, 0.0), 10);
    assert_eq!(lerp_u8(10, 200, 1.0), 200);
    assert_eq!(lerp_u8(0, 255, 0.5), 128);
}

#[test]
fn clamp_unit_maps_nan_to_zero() {
    assert_eq!(clamp_unit(1.7), 1.0);
    assert_eq!(clamp_unit(-0.2), 0.0);
    assert_eq!(clamp_unit(0.3), 0.3);
    assert_eq!(clamp_unit(f64::NAN), 0.0);
}
