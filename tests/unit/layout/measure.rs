use super::*;

#[test]
fn monospace_counts_chars_not_bytes() {
    let mut m = MonospaceMeasure { em: 0.5 };
    let font = FontSpec {
        face: None,
        size: 20.0,
    };
    assert_eq!(m.measure("abcd", &font), 40.0);
    assert_eq!(m.measure("éé", &font), 20.0);
    assert_eq!(m.measure_char('x', &font), 10.0);
}

#[test]
fn parley_without_face_falls_back_to_estimate() {
    let mut m = ParleyMeasure::new();
    let font = FontSpec {
        face: None,
        size: 10.0,
    };
    assert!((m.measure("abc", &font) - 18.0).abs() < 1e-4);
    assert!((m.measure_char('a', &font) - 6.0).abs() < 1e-4);
    assert_eq!(m.cached_chars(), 0);
}

fn dejavu() -> std::sync::Arc<crate::assets::fonts::FontFace> {
    let mut fonts = crate::assets::fonts::FontBook::new(Vec::new(), std::time::Duration::ZERO);
    fonts
        .provide(
            "DejaVu Sans",
            400,
            std::fs::read("tests/data/fonts/DejaVuSans.ttf").unwrap(),
        )
        .unwrap();
    fonts.fallback_face(400).unwrap()
}

#[test]
fn lone_space_has_an_advance() {
    let face = dejavu();
    let mut m = ParleyMeasure::new();
    let font = FontSpec {
        face: Some(&face),
        size: 40.0,
    };
    assert!(m.measure_char(' ', &font) > 5.0);
    assert!(m.shaper_mut().shape_line(" ", &face, 40.0).unwrap().width > 5.0);
    assert!(m.cached_chars() > 0);
}

#[test]
fn letter_spaced_width_counts_every_character() {
    let face = dejavu();
    let mut m = ParleyMeasure::new();
    let font = FontSpec {
        face: Some(&face),
        size: 40.0,
    };
    let per_char: f32 = "A B".chars().map(|c| m.measure_char(c, &font)).sum();
    let spaced = crate::layout::fit::line_width("A B", 3.0, &font, &mut m);
    assert!((spaced - (per_char + 6.0)).abs() < 1e-3);
    // Without spacing the shaped line agrees with the per-character sum.
    let whole = m.measure("A B", &font);
    assert!((whole - per_char).abs() < 1.0, "{whole} vs {per_char}");
}
