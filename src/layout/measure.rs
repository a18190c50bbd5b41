use crate::assets::fonts::FontFace;
use crate::layout::shaper::TextShaper;
use std::collections::HashMap;

/// The font a measurement is taken with. `face` is `None` when no face is loaded at all.
#[derive(Clone, Copy, Debug)]
pub struct FontSpec<'a> {
    pub face: Option<&'a FontFace>,
    pub size: f32,
}

/// Horizontal advance of text under a font.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec<'_>) -> f32;

    /// Advance of a single character, used when letter spacing is applied per character.
    fn measure_char(&mut self, c: char, font: &FontSpec<'_>) -> f32 {
        let mut buf = [0u8; 4];
        self.measure(c.encode_utf8(&mut buf), font)
    }
}

/// Every character advances by `em * size`. Deterministic and font-independent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    pub em: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { em: 0.6 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec<'_>) -> f32 {
        text.chars().count() as f32 * self.em * font.size
    }
}

/// Measures with Parley shaping. Per-character widths are cached by (char, face, size).
pub struct ParleyMeasure {
    pub(crate) shaper: TextShaper,
    char_cache: HashMap<(char, u32, u32), f32>,
    fallback: MonospaceMeasure,
}

impl Default for ParleyMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyMeasure {
    pub fn new() -> Self {
        Self {
            shaper: TextShaper::new(),
            char_cache: HashMap::new(),
            fallback: MonospaceMeasure::default(),
        }
    }

    pub fn shaper_mut(&mut self) -> &mut TextShaper {
        &mut self.shaper
    }

    pub fn cached_chars(&self) -> usize {
        self.char_cache.len()
    }

    fn shaped_width(&mut self, text: &str, face: &FontFace, font: &FontSpec<'_>) -> f32 {
        match self.shaper.shape_line(text, face, font.size) {
            Ok(line) => line.width,
            Err(e) => {
                tracing::warn!(family = %face.family, "text shaping failed, estimating width: {e}");
                self.fallback.measure(text, font)
            }
        }
    }
}

impl TextMeasure for ParleyMeasure {
    fn measure(&mut self, text: &str, font: &FontSpec<'_>) -> f32 {
        match font.face {
            Some(face) => self.shaped_width(text, face, font),
            None => self.fallback.measure(text, font),
        }
    }

    fn measure_char(&mut self, c: char, font: &FontSpec<'_>) -> f32 {
        let Some(face) = font.face else {
            return self.fallback.measure_char(c, font);
        };
        let key = (c, face.id, font.size.to_bits());
        if let Some(w) = self.char_cache.get(&key) {
            return *w;
        }
        let mut buf = [0u8; 4];
        let w = self.shaped_width(c.encode_utf8(&mut buf), face, font);
        self.char_cache.insert(key, w);
        w
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/measure.rs"]
mod tests;
