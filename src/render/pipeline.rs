use crate::assets::cache::{ImageCache, SourceKey};
use crate::assets::fonts::{FontBook, FontFace, FontResolution};
use crate::config::{EditorConfig, WatermarkConfig};
use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::interact::hit::{overlay_transform, HandleMetrics};
use crate::layout::fit::{layout_text_box, FitParams};
use crate::layout::measure::ParleyMeasure;
use crate::render::composite::{dest_out_in_place, over_in_place};
use crate::render::cpu::{affine_to_cpu, bezpath_to_cpu, color_to_cpu, image_paint, round_stroke, Layer};
use crate::render::decorations::{draw_overlay_selection, draw_text_selection};
use crate::render::text::{composite_text_block, Label};
use crate::scene::model::{ImageOverlay, Stroke, TextBox};
use crate::scene::scene::Scene;
use kurbo::Shape;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A composited surface, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba8_premul.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Everything a frame is derived from.
pub struct FrameInput<'a> {
    pub scene: &'a Scene,
    pub images: &'a ImageCache,
    pub fonts: &'a FontBook,
    /// Stroke still being drawn; painted after the committed ones.
    pub in_progress: Option<&'a Stroke>,
    pub metrics: HandleMetrics,
    /// Selection outlines and handles. Off for export.
    pub decorations: bool,
    pub now: Duration,
}

/// The closed set of things drawn above the base image, in paint order.
#[derive(Clone, Copy, Debug)]
pub enum Drawable<'a> {
    Stroke(&'a Stroke),
    Overlay(&'a ImageOverlay),
    Text(&'a TextBox),
}

/// Paint order: committed strokes, the in-progress stroke, overlays, text boxes.
pub fn drawables<'a>(scene: &'a Scene, in_progress: Option<&'a Stroke>) -> Vec<Drawable<'a>> {
    scene
        .strokes()
        .iter()
        .chain(in_progress)
        .map(Drawable::Stroke)
        .chain(scene.overlays().iter().map(Drawable::Overlay))
        .chain(scene.text_boxes().iter().map(Drawable::Text))
        .collect()
}

/// Face to draw `family`/`weight` with right now. A face still inside its settle window draws
/// with the fallback.
pub(crate) fn face_for(
    fonts: &FontBook,
    family: &str,
    weight: u16,
    now: Duration,
) -> Option<Arc<FontFace>> {
    match fonts.resolve(family, weight, now) {
        FontResolution::Ready(f) | FontResolution::Fallback(f) => Some(f),
        FontResolution::Waiting { .. } => fonts.fallback_face(weight),
        FontResolution::Unavailable => None,
    }
}

/// Path of an ink stroke: a dot for a single point, otherwise a polyline.
pub(crate) fn stroke_outline(stroke: &Stroke) -> Option<BezPath> {
    let (first, rest) = stroke.points.split_first()?;
    if rest.is_empty() {
        return Some(kurbo::Circle::new(*first, stroke.size / 2.0).to_path(0.1));
    }
    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    Some(path)
}

struct Painter<'r, 'a> {
    input: &'r FrameInput<'a>,
    dst: Vec<u8>,
    /// Ink accumulates separately so erasers only cut through ink.
    ink: Vec<u8>,
    ink_dirty: bool,
    layer: &'r mut Layer,
    measure: &'r mut ParleyMeasure,
    paints: &'r mut HashMap<SourceKey, vello_cpu::Image>,
    params: FitParams,
}

impl Painter<'_, '_> {
    fn flush_ink(&mut self) -> CaptionResult<()> {
        if std::mem::take(&mut self.ink_dirty) {
            over_in_place(&mut self.dst, &self.ink, 1.0)?;
        }
        Ok(())
    }

    fn draw_stroke(&mut self, stroke: &Stroke) -> CaptionResult<()> {
        let Some(path) = stroke_outline(stroke) else {
            return Ok(());
        };
        let color = if stroke.is_eraser {
            Rgba8::BLACK
        } else {
            stroke.color
        };
        self.layer.begin();
        self.layer.ctx.set_paint(color_to_cpu(color));
        let path = bezpath_to_cpu(&path);
        if stroke.points.len() == 1 {
            self.layer.ctx.fill_path(&path);
        } else {
            self.layer.ctx.set_stroke(round_stroke(stroke.size));
            self.layer.ctx.stroke_path(&path);
        }
        let mask = self.layer.finish();
        if stroke.is_eraser {
            dest_out_in_place(&mut self.ink, mask)?;
        } else {
            over_in_place(&mut self.ink, mask, 1.0)?;
        }
        self.ink_dirty = true;
        Ok(())
    }

    fn draw_overlay(&mut self, o: &ImageOverlay) -> CaptionResult<()> {
        self.flush_ink()?;
        let Some(img) = self.input.images.get(&o.source) else {
            tracing::trace!(source = %o.source, "overlay image not decoded yet");
            return Ok(());
        };
        let paint = match self.paints.get(&o.source) {
            Some(p) => p.clone(),
            None => {
                let p = image_paint(&img)?;
                self.paints.insert(o.source.clone(), p.clone());
                p
            }
        };
        let (iw, ih) = (f64::from(img.width), f64::from(img.height));
        let transform = overlay_transform(o)
            * Affine::translate((o.x, o.y))
            * Affine::scale_non_uniform(o.width / iw, o.height / ih);

        self.layer.begin();
        self.layer.ctx.set_transform(affine_to_cpu(transform));
        self.layer.ctx.set_paint(paint);
        self.layer
            .ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        self.layer.finish();
        over_in_place(&mut self.dst, self.layer.bytes(), o.opacity)
    }

    fn draw_text(&mut self, tb: &TextBox) -> CaptionResult<()> {
        self.flush_ink()?;
        if !tb.has_text() {
            return Ok(());
        }
        let face = face_for(
            self.input.fonts,
            &tb.style.font_family,
            tb.style.font_weight,
            self.input.now,
        );
        let block = layout_text_box(tb, face.as_deref(), &mut *self.measure, &self.params);
        let Some(face) = face else {
            tracing::debug!(box_id = tb.id.0, "no font face registered, text not drawn");
            return Ok(());
        };
        composite_text_block(
            &mut self.dst,
            self.layer,
            self.measure.shaper_mut(),
            &block,
            &face,
            &tb.style,
        )
    }
}

impl Drawable<'_> {
    fn draw(&self, painter: &mut Painter<'_, '_>) -> CaptionResult<()> {
        match *self {
            Self::Stroke(s) => painter.draw_stroke(s),
            Self::Overlay(o) => painter.draw_overlay(o),
            Self::Text(t) => painter.draw_text(t),
        }
    }
}

/// Re-derives a whole frame from scene state on every call.
pub struct FrameRenderer {
    measure: ParleyMeasure,
    params: FitParams,
    watermark: Option<WatermarkConfig>,
    layer: Option<Layer>,
    paints: HashMap<SourceKey, vello_cpu::Image>,
}

impl FrameRenderer {
    pub fn new(cfg: &EditorConfig) -> Self {
        Self {
            measure: ParleyMeasure::new(),
            params: FitParams::from_config(cfg),
            watermark: cfg.watermark.clone(),
            layer: None,
            paints: HashMap::new(),
        }
    }

    pub fn measure_mut(&mut self) -> &mut ParleyMeasure {
        &mut self.measure
    }

    /// Drop cached image paints, e.g. when the session is reset.
    pub fn forget_images(&mut self) {
        self.paints.clear();
    }

    #[tracing::instrument(level = "debug", skip_all, fields(decorations = input.decorations))]
    pub fn render(&mut self, input: &FrameInput<'_>) -> CaptionResult<Frame> {
        let surface = input
            .scene
            .surface()
            .ok_or_else(|| CaptionError::invariant("base image is not loaded yet"))?;
        let (width, height) = (surface.width, surface.height);

        let stale = self
            .layer
            .as_ref()
            .is_none_or(|l| u32::from(l.width) != width || u32::from(l.height) != height);
        if stale {
            self.layer = Some(Layer::new(width, height)?);
        }
        let layer = self
            .layer
            .as_mut()
            .ok_or_else(|| CaptionError::invariant("render layer missing"))?;

        let len = width as usize * height as usize * 4;
        let mut dst = vec![0u8; len];
        match input.images.get(input.scene.base()) {
            Some(base) if base.rgba8_premul.len() == len => {
                dst.copy_from_slice(&base.rgba8_premul);
            }
            Some(_) => tracing::warn!("base image size does not match the surface"),
            None => tracing::debug!(base = %input.scene.base(), "base image missing from cache"),
        }

        if let Some(wm) = &self.watermark {
            draw_watermark(&mut dst, layer, &mut self.measure, wm, input, width, height)?;
        }

        let mut painter = Painter {
            input,
            dst,
            ink: vec![0u8; len],
            ink_dirty: false,
            layer,
            measure: &mut self.measure,
            paints: &mut self.paints,
            params: self.params,
        };

        let items = drawables(input.scene, input.in_progress);
        let first_text = items
            .iter()
            .position(|d| matches!(d, Drawable::Text(_)))
            .unwrap_or(items.len());
        let (below_text, texts) = items.split_at(first_text);
        for item in below_text {
            item.draw(&mut painter)?;
        }
        painter.flush_ink()?;

        if input.decorations {
            if let Some(o) = input.scene.selected_overlay() {
                painter.layer.begin();
                draw_overlay_selection(painter.layer, o, &input.metrics);
                painter.layer.finish();
                over_in_place(&mut painter.dst, painter.layer.bytes(), 1.0)?;
            }
        }

        for item in texts {
            item.draw(&mut painter)?;
        }

        if input.decorations {
            if let Some(tb) = input.scene.selected_text_box().filter(|tb| tb.has_text()) {
                let face = input.fonts.fallback_face(400);
                painter.layer.begin();
                draw_text_selection(
                    painter.layer,
                    painter.measure.shaper_mut(),
                    tb,
                    &input.metrics,
                    face.as_deref(),
                )?;
                painter.layer.finish();
                over_in_place(&mut painter.dst, painter.layer.bytes(), 1.0)?;
            }
        }

        Ok(Frame {
            width,
            height,
            rgba8_premul: painter.dst,
        })
    }
}

fn draw_watermark(
    dst: &mut [u8],
    layer: &mut Layer,
    measure: &mut ParleyMeasure,
    wm: &WatermarkConfig,
    input: &FrameInput<'_>,
    width: u32,
    height: u32,
) -> CaptionResult<()> {
    if wm.text.is_empty() {
        return Ok(());
    }
    let Some(face) = input.fonts.fallback_face(400) else {
        return Ok(());
    };
    let shaper = measure.shaper_mut();
    let mut label = Label {
        text: &wm.text,
        x: 0.0,
        baseline: f64::from(height) - wm.margin,
        size: wm.font_size,
        color: wm.color,
    };
    label.x = f64::from(width) - wm.margin - f64::from(label.width(shaper, &face)?);
    layer.begin();
    label.draw(layer, shaper, &face)?;
    layer.finish();
    over_in_place(dst, layer.bytes(), 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
