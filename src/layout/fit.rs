use crate::assets::fonts::FontFace;
use crate::config::EditorConfig;
use crate::layout::measure::{FontSpec, TextMeasure};
use crate::scene::model::{Align, TextBox, TextStyle, VerticalAlign};

/// Constants of the font-size search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitParams {
    pub step: f32,
    pub line_height: f32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            step: 2.0,
            line_height: 1.2,
        }
    }
}

impl FitParams {
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self {
            step: cfg.font_step,
            line_height: cfg.line_height,
        }
    }
}

/// Result of [`fit_text`].
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    pub font_size: f32,
    pub lines: Vec<String>,
}

/// A fitted line with its draw position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Left edge of the line's ink advance.
    pub x: f64,
    pub baseline: f64,
    pub width: f32,
}

/// Fitted text with every line positioned inside its box.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub font_size: f32,
    pub lines: Vec<PlacedLine>,
}

/// Width of `line`. With letter spacing the advance is the sum of per-character widths plus the
/// spacing between characters.
pub fn line_width(
    line: &str,
    letter_spacing: f32,
    font: &FontSpec<'_>,
    measure: &mut dyn TextMeasure,
) -> f32 {
    if letter_spacing == 0.0 {
        return measure.measure(line, font);
    }
    let mut width = 0.0;
    for (i, c) in line.chars().enumerate() {
        if i > 0 {
            width += letter_spacing;
        }
        width += measure.measure_char(c, font);
    }
    width
}

/// Greedy word wrap. Manual newlines always break; a word wider than the box gets its own line.
fn wrap(
    text: &str,
    max_width: f64,
    letter_spacing: f32,
    font: &FontSpec<'_>,
    measure: &mut dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    for segment in text.split('\n') {
        let mut current = String::new();
        let mut any_word = false;
        for word in segment.split(' ').filter(|w| !w.is_empty()) {
            any_word = true;
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            let w = line_width(&candidate, letter_spacing, font, measure);
            if f64::from(w) > max_width {
                if current.is_empty() {
                    lines.push(candidate);
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_owned()));
                }
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        } else if !any_word {
            lines.push(String::new());
        }
    }
    lines
}

/// Find the largest font size in `[min_font_size, max_font_size]` whose wrapped lines fit the
/// box height, stepping down from the maximum. At the minimum the wrap is accepted even if it
/// overflows vertically.
///
/// Pure: only measures, never draws.
#[tracing::instrument(level = "trace", skip(tb, style, face, measure), fields(box_id = tb.id.0))]
pub fn fit_text(
    text: &str,
    tb: &TextBox,
    style: &TextStyle,
    face: Option<&FontFace>,
    measure: &mut dyn TextMeasure,
    params: &FitParams,
) -> FittedText {
    let max = tb.max_font_size.max(1.0);
    let min = tb.min_font_size.clamp(1.0, max);
    let text = style.text_case.apply(text);
    if text.is_empty() {
        return FittedText {
            font_size: max,
            lines: Vec::new(),
        };
    }

    let step = if params.step > 0.0 { params.step } else { 2.0 };
    let mut size = max;
    loop {
        let font = FontSpec { face, size };
        let lines = wrap(&text, tb.width, style.letter_spacing, &font, measure);
        let total = lines.len() as f32 * size * params.line_height;
        if f64::from(total) <= tb.height || size <= min {
            return FittedText {
                font_size: size,
                lines,
            };
        }
        size = (size - step).max(min);
    }
}

/// Fit `tb`'s text and position each line by the box's alignment.
pub fn layout_text_box(
    tb: &TextBox,
    face: Option<&FontFace>,
    measure: &mut dyn TextMeasure,
    params: &FitParams,
) -> TextBlock {
    let fitted = fit_text(&tb.text, tb, &tb.style, face, measure, params);
    let font = FontSpec {
        face,
        size: fitted.font_size,
    };
    let line_advance = f64::from(fitted.font_size * params.line_height);
    let block_height = line_advance * fitted.lines.len() as f64;
    let y0 = tb.y
        + match tb.vertical_align.unwrap_or_default() {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => ((tb.height - block_height) / 2.0).max(0.0),
            VerticalAlign::Bottom => (tb.height - block_height).max(0.0),
        };

    let lines = fitted
        .lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let width = line_width(&text, tb.style.letter_spacing, &font, measure);
            let x = match tb.align {
                Align::Left => tb.x,
                Align::Center => tb.x + tb.width / 2.0 - f64::from(width) / 2.0,
                Align::Right => tb.x + tb.width - f64::from(width),
            };
            PlacedLine {
                text,
                x,
                baseline: y0 + line_advance * i as f64,
                width,
            }
        })
        .collect();

    TextBlock {
        font_size: fitted.font_size,
        lines,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
