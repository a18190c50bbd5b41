use super::*;
use serde_json::json;

#[test]
fn parses_short_long_and_alpha_hex() {
    assert_eq!(Rgba8::parse_hex("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(Rgba8::parse_hex("#ff0000").unwrap(), Rgba8::rgb(255, 0, 0));
    assert_eq!(
        Rgba8::parse_hex("0000ff80").unwrap(),
        Rgba8::rgba(0, 0, 255, 0x80)
    );
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
}

#[test]
fn serde_uses_hex_strings() {
    let c: Rgba8 = serde_json::from_value(json!("#00ff00")).unwrap();
    assert_eq!(c, Rgba8::rgb(0, 255, 0));
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#00ff00"));
    assert_eq!(
        serde_json::to_value(Rgba8::rgba(1, 2, 3, 4)).unwrap(),
        json!("#01020304")
    );
}

#[test]
fn premul_scales_channels_by_alpha() {
    let c = Rgba8::rgba(200, 100, 0, 128);
    let [r, g, b, a] = c.to_premul_array();
    assert_eq!(a, 128);
    assert_eq!(r, ((200u32 * 128 + 127) / 255) as u8);
    assert_eq!(g, ((100u32 * 128 + 127) / 255) as u8);
    assert_eq!(b, 0);
}

#[test]
fn surface_size_rejects_zero() {
    assert!(SurfaceSize::new(0, 10).is_err());
    let s = SurfaceSize::new(400, 300).unwrap();
    assert_eq!(s.min_side(), 300.0);
    assert_eq!(s.rect(), Rect::new(0.0, 0.0, 400.0, 300.0));
}
