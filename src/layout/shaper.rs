use crate::assets::fonts::FontFace;
use crate::foundation::error::{CaptionError, CaptionResult};
use std::collections::HashMap;

/// Parley brush type. Colour is applied at draw time, so the brush carries nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PlainBrush;

/// A glyph positioned relative to the line origin (x from the left edge, y from the baseline).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// One shaped, unwrapped line of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedLine {
    pub glyphs: Vec<ShapedGlyph>,
    pub width: f32,
}

/// Shapes single lines with Parley against faces registered from raw font bytes.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<PlainBrush>,
    families: HashMap<u32, String>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Register `face` with Parley once and return the family name it resolved to.
    fn family_for(&mut self, face: &FontFace) -> CaptionResult<String> {
        if let Some(name) = self.families.get(&face.id) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(face.data.data.clone(), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CaptionError::decode(format!("no font families registered for \"{}\"", face.family))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionError::decode("registered font family has no name"))?
            .to_string();

        tracing::debug!(face = face.id, family = %family_name, "registered font with shaper");
        self.families.insert(face.id, family_name.clone());
        Ok(family_name)
    }

    /// Shape `text` on a single line at `size_px`.
    pub fn shape_line(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
    ) -> CaptionResult<ShapedLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CaptionError::invariant("font size must be finite and > 0"));
        }
        if text.is_empty() {
            return Ok(ShapedLine::default());
        }
        let family_name = self.family_for(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(PlainBrush));

        let mut layout: parley::Layout<PlainBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut out = ShapedLine {
            glyphs: Vec::with_capacity(text.len()),
            // Includes trailing whitespace, so a lone space still advances.
            width: layout.full_width(),
        };
        for line in layout.lines() {
            let baseline = line.metrics().baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                out.glyphs.extend(run.glyphs().map(|g| ShapedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - baseline,
                }));
            }
        }
        Ok(out)
    }
}
