use super::*;
use crate::layout::measure::MonospaceMeasure;
use crate::scene::model::{BoxOrigin, TextBoxId, TextCase};

fn text_box(width: f64, height: f64, max: f32, min: f32, text: &str) -> TextBox {
    let mut style = TextStyle::default();
    style.font_size = max;
    TextBox {
        id: TextBoxId(0),
        origin: BoxOrigin::Template,
        label: None,
        x: 100.0,
        y: 100.0,
        width,
        height,
        max_font_size: max,
        min_font_size: min,
        align: Align::Center,
        vertical_align: None,
        style,
        text: text.to_owned(),
    }
}

fn fit(tb: &TextBox) -> FittedText {
    let mut m = MonospaceMeasure::default();
    fit_text(&tb.text, tb, &tb.style, None, &mut m, &FitParams::default())
}

#[test]
fn narrow_box_shrinks_until_height_fits() {
    let tb = text_box(300.0, 100.0, 60.0, 20.0, "HELLO WORLD");
    let out = fit(&tb);
    assert_eq!(out.font_size, 44.0);
    assert_eq!(out.lines, vec!["HELLO WORLD".to_owned()]);
    assert!(out.lines.len() as f32 * out.font_size * 1.2 <= 100.0);
}

#[test]
fn wraps_before_shrinking_when_height_allows() {
    let tb = text_box(300.0, 200.0, 60.0, 20.0, "hello world");
    let out = fit(&tb);
    assert_eq!(out.font_size, 60.0);
    assert_eq!(out.lines, vec!["HELLO".to_owned(), "WORLD".to_owned()]);
}

#[test]
fn bottoms_out_at_min_and_accepts_overflow() {
    let tb = text_box(100.0, 10.0, 40.0, 20.0, "one two three four five");
    let out = fit(&tb);
    assert_eq!(out.font_size, 20.0);
    assert!(out.lines.len() > 1);
}

#[test]
fn manual_newlines_always_break() {
    let tb = text_box(1000.0, 1000.0, 20.0, 10.0, "top\n\nbottom");
    let out = fit(&tb);
    assert_eq!(
        out.lines,
        vec!["TOP".to_owned(), String::new(), "BOTTOM".to_owned()]
    );
}

#[test]
fn overlong_word_gets_its_own_line() {
    let tb = text_box(50.0, 1000.0, 20.0, 20.0, "is SUPERCALIFRAGILISTIC ok");
    let out = fit(&tb);
    assert_eq!(
        out.lines,
        vec![
            "IS".to_owned(),
            "SUPERCALIFRAGILISTIC".to_owned(),
            "OK".to_owned()
        ]
    );
}

#[test]
fn empty_text_has_no_lines() {
    let tb = text_box(100.0, 100.0, 40.0, 20.0, "");
    let out = fit(&tb);
    assert!(out.lines.is_empty());
    assert_eq!(out.font_size, 40.0);
}

#[test]
fn letter_spacing_sums_per_character_widths() {
    let mut m = MonospaceMeasure { em: 0.5 };
    let font = FontSpec {
        face: None,
        size: 10.0,
    };
    assert_eq!(line_width("ABC", 5.0, &font, &mut m), 25.0);
    assert_eq!(line_width("ABC", 0.0, &font, &mut m), 15.0);
    assert_eq!(line_width("", 5.0, &font, &mut m), 0.0);
}

#[test]
fn fitting_is_idempotent() {
    let tb = text_box(240.0, 90.0, 50.0, 12.0, "the quick brown fox jumps over");
    assert_eq!(fit(&tb), fit(&tb));
}

#[test]
fn size_stays_in_range_and_lines_fit_width() {
    let texts = [
        "a",
        "short",
        "a much longer caption that will need wrapping",
        "x\ny\nz w v u",
        "antidisestablishmentarianism everywhere",
    ];
    let boxes = [(80.0, 40.0), (200.0, 60.0), (400.0, 300.0), (55.0, 500.0)];
    let mut m = MonospaceMeasure::default();
    for text in texts {
        for (w, h) in boxes {
            for (max, min) in [(60.0, 20.0), (30.0, 30.0), (24.0, 8.0)] {
                let tb = text_box(w, h, max, min, text);
                let out = fit(&tb);
                assert!(out.font_size >= min && out.font_size <= max);
                let font = FontSpec {
                    face: None,
                    size: out.font_size,
                };
                for line in &out.lines {
                    let lw = f64::from(line_width(line, 0.0, &font, &mut m));
                    assert!(
                        lw <= w || !line.contains(' '),
                        "line {line:?} is {lw} wide in a {w} box"
                    );
                }
            }
        }
    }
}

#[test]
fn case_transform_is_applied_before_measuring() {
    let mut tb = text_box(1000.0, 1000.0, 20.0, 10.0, "MiXeD");
    tb.style.text_case = TextCase::Lower;
    assert_eq!(fit(&tb).lines, vec!["mixed".to_owned()]);
    tb.style.text_case = TextCase::AsWritten;
    assert_eq!(fit(&tb).lines, vec!["MiXeD".to_owned()]);
}

#[test]
fn alignment_positions_lines() {
    let mut m = MonospaceMeasure { em: 0.5 };
    let params = FitParams::default();
    let mut tb = text_box(300.0, 100.0, 20.0, 20.0, "ab");

    tb.align = Align::Left;
    let block = layout_text_box(&tb, None, &mut m, &params);
    assert_eq!(block.lines[0].x, 100.0);
    assert_eq!(block.lines[0].width, 20.0);
    assert_eq!(block.lines[0].baseline, 100.0);

    tb.align = Align::Center;
    let block = layout_text_box(&tb, None, &mut m, &params);
    assert_eq!(block.lines[0].x, 240.0);

    tb.align = Align::Right;
    let block = layout_text_box(&tb, None, &mut m, &params);
    assert_eq!(block.lines[0].x, 380.0);
}

#[test]
fn baselines_advance_and_vertical_align_offsets_block() {
    let mut m = MonospaceMeasure { em: 0.5 };
    let params = FitParams::default();
    let mut tb = text_box(300.0, 100.0, 20.0, 20.0, "a\nb");

    let block = layout_text_box(&tb, None, &mut m, &params);
    assert_eq!(block.lines.len(), 2);
    assert!((block.lines[1].baseline - 124.0).abs() < 1e-4);

    tb.vertical_align = Some(VerticalAlign::Bottom);
    let block = layout_text_box(&tb, None, &mut m, &params);
    assert!((block.lines[0].baseline - 152.0).abs() < 1e-4);

    tb.vertical_align = Some(VerticalAlign::Middle);
    let block = layout_text_box(&tb, None, &mut m, &params);
    assert!((block.lines[0].baseline - 126.0).abs() < 1e-4);
}
