use super::*;

#[test]
fn mul_div255_variants_align() {
    for &(x, y) in &[(0u16, 0u16), (255, 255), (128, 64), (200, 17)] {
        assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
    }
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 0), 0);
}

#[test]
fn degrees_wrap_into_half_open_range() {
    assert_eq!(normalize_degrees(360.0), 0.0);
    assert_eq!(normalize_degrees(-90.0), 270.0);
    assert_eq!(normalize_degrees(725.0), 5.0);
    assert!(normalize_degrees(-1e-18) < 360.0);
}

#[test]
fn clamp_loose_collapses_inverted_range() {
    assert_eq!(clamp_loose(5.0, 0.0, 10.0), 5.0);
    assert_eq!(clamp_loose(-5.0, 0.0, 10.0), 0.0);
    assert_eq!(clamp_loose(5.0, 3.0, 1.0), 3.0);
}
