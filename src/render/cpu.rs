//! Glue between scene types and `vello_cpu`.

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, BezPath, Point, Rgba8};
use crate::foundation::error::{CaptionError, CaptionResult};
use std::sync::Arc;

/// An offscreen pixmap plus the context that draws into it.
pub(crate) struct Layer {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) ctx: vello_cpu::RenderContext,
    pub(crate) pixmap: vello_cpu::Pixmap,
}

impl Layer {
    pub(crate) fn new(width: u32, height: u32) -> CaptionResult<Self> {
        let width: u16 = width
            .try_into()
            .map_err(|_| CaptionError::invariant("surface width exceeds u16"))?;
        let height: u16 = height
            .try_into()
            .map_err(|_| CaptionError::invariant("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Start a fresh pass: transparent pixels, empty draw state.
    pub(crate) fn begin(&mut self) {
        self.ctx.reset();
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
    }

    /// Rasterise everything recorded since [`Layer::begin`].
    pub(crate) fn finish(&mut self) -> &[u8] {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

pub(crate) fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Round-capped, round-joined stroke of `width`.
pub(crate) fn round_stroke(width: f64) -> vello_cpu::kurbo::Stroke {
    let mut stroke = vello_cpu::kurbo::Stroke::new(width);
    stroke.join = vello_cpu::kurbo::Join::Round;
    stroke.start_cap = vello_cpu::kurbo::Cap::Round;
    stroke.end_cap = vello_cpu::kurbo::Cap::Round;
    stroke
}

pub(crate) fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CaptionResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CaptionError::invariant("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CaptionError::invariant("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CaptionError::invariant("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

pub(crate) fn image_paint(img: &DecodedImage) -> CaptionResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(img.rgba8_premul.as_slice(), img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
