use crate::assets::fonts::FontFace;
use crate::foundation::core::Rgba8;
use crate::foundation::error::CaptionResult;
use crate::layout::fit::TextBlock;
use crate::layout::shaper::{ShapedGlyph, TextShaper};
use crate::render::composite::{blur_rgba8_premul, over_in_place, shadow_blur_params, tinted_shadow};
use crate::render::cpu::{color_to_cpu, round_stroke, Layer};
use crate::scene::model::TextStyle;

/// Glyphs of one placed line in surface coordinates.
fn line_glyphs(
    shaper: &mut TextShaper,
    text: &str,
    x: f64,
    baseline: f64,
    face: &FontFace,
    size: f32,
    letter_spacing: f32,
) -> CaptionResult<Vec<vello_cpu::Glyph>> {
    let place = |g: &ShapedGlyph, pen: f32| vello_cpu::Glyph {
        id: g.id,
        x: x as f32 + pen + g.x,
        y: baseline as f32 + g.y,
    };

    if letter_spacing == 0.0 {
        let shaped = shaper.shape_line(text, face, size)?;
        return Ok(shaped.glyphs.iter().map(|g| place(g, 0.0)).collect());
    }

    // Per-character advance so spacing matches the measured width.
    let mut out = Vec::with_capacity(text.len());
    let mut pen = 0.0f32;
    let mut buf = [0u8; 4];
    for (i, c) in text.chars().enumerate() {
        if i > 0 {
            pen += letter_spacing;
        }
        let shaped = shaper.shape_line(c.encode_utf8(&mut buf), face, size)?;
        out.extend(shaped.glyphs.iter().map(|g| place(g, pen)));
        pen += shaped.width;
    }
    Ok(out)
}

/// Draw a fitted block into `layer` (outline first, then fill) and composite it onto `dst`
/// beneath its shadow.
pub(crate) fn composite_text_block(
    dst: &mut [u8],
    layer: &mut Layer,
    shaper: &mut TextShaper,
    block: &TextBlock,
    face: &FontFace,
    style: &TextStyle,
) -> CaptionResult<()> {
    let mut runs = Vec::with_capacity(block.lines.len());
    for line in block.lines.iter().filter(|l| !l.text.is_empty()) {
        runs.push(line_glyphs(
            shaper,
            &line.text,
            line.x,
            line.baseline,
            face,
            block.font_size,
            style.letter_spacing,
        )?);
    }
    if runs.is_empty() {
        return Ok(());
    }

    layer.begin();
    if style.outline.width > 0.0 && !style.outline.color.is_invisible() {
        layer.ctx.set_stroke(round_stroke(f64::from(style.outline.width)));
        layer.ctx.set_paint(color_to_cpu(style.outline.color));
        for glyphs in &runs {
            layer
                .ctx
                .glyph_run(&face.data)
                .font_size(block.font_size)
                .stroke_glyphs(glyphs.iter().cloned());
        }
    }
    layer.ctx.set_paint(color_to_cpu(style.color));
    for glyphs in &runs {
        layer
            .ctx
            .glyph_run(&face.data)
            .font_size(block.font_size)
            .fill_glyphs(glyphs.iter().cloned());
    }
    layer.finish();

    if style.shadow.is_visible() {
        composite_shadow(dst, layer, style)?;
    }
    over_in_place(dst, layer.bytes(), 1.0)
}

fn composite_shadow(dst: &mut [u8], layer: &Layer, style: &TextStyle) -> CaptionResult<()> {
    let (w, h) = (u32::from(layer.width), u32::from(layer.height));
    let shadow = &style.shadow;
    let tinted = tinted_shadow(
        layer.bytes(),
        w,
        h,
        shadow.color,
        shadow.offset_x.round() as i32,
        shadow.offset_y.round() as i32,
    )?;
    let (radius, sigma) = shadow_blur_params(shadow.blur);
    let blurred = blur_rgba8_premul(&tinted, w, h, radius, sigma)?;
    over_in_place(dst, &blurred, 1.0)
}

/// Single-colour line of text, used for the watermark and the width readout.
pub(crate) struct Label<'a> {
    pub(crate) text: &'a str,
    pub(crate) x: f64,
    pub(crate) baseline: f64,
    pub(crate) size: f32,
    pub(crate) color: Rgba8,
}

impl Label<'_> {
    pub(crate) fn width(&self, shaper: &mut TextShaper, face: &FontFace) -> CaptionResult<f32> {
        Ok(shaper.shape_line(self.text, face, self.size)?.width)
    }

    pub(crate) fn draw(
        &self,
        layer: &mut Layer,
        shaper: &mut TextShaper,
        face: &FontFace,
    ) -> CaptionResult<()> {
        let glyphs = line_glyphs(shaper, self.text, self.x, self.baseline, face, self.size, 0.0)?;
        layer.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        layer.ctx.set_paint(color_to_cpu(self.color));
        layer
            .ctx
            .glyph_run(&face.data)
            .font_size(self.size)
            .fill_glyphs(glyphs.into_iter());
        Ok(())
    }
}
