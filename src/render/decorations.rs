use crate::assets::fonts::FontFace;
use crate::foundation::core::{BezPath, Rect, Rgba8};
use crate::foundation::error::CaptionResult;
use crate::interact::hit::{
    overlay_handle_local, overlay_transform, rotation_handle_local, text_handle_rect,
    HandleMetrics,
};
use crate::layout::shaper::TextShaper;
use crate::render::cpu::{affine_to_cpu, bezpath_to_cpu, color_to_cpu, Layer};
use crate::render::text::Label;
use crate::scene::model::{ImageOverlay, OverlayHandle, Side, TextBox};
use kurbo::Shape;

const ACCENT: Rgba8 = Rgba8::rgb(0, 162, 255);
const HANDLE_FILL: Rgba8 = Rgba8::WHITE;
const LINE_WIDTH: f64 = 2.0;
const READOUT_SIZE: f32 = 14.0;

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn handle_square(layer: &mut Layer, r: Rect) {
    layer.ctx.set_paint(color_to_cpu(HANDLE_FILL));
    layer.ctx.fill_rect(&rect_to_cpu(r));
    layer.ctx.set_paint(color_to_cpu(ACCENT));
    layer.ctx.stroke_rect(&rect_to_cpu(r));
}

/// Outline, eight resize handles, and the rotation handle with its guide line, all in the
/// overlay's rotated frame.
pub(crate) fn draw_overlay_selection(layer: &mut Layer, o: &ImageOverlay, m: &HandleMetrics) {
    layer.ctx.set_transform(affine_to_cpu(overlay_transform(o)));
    layer
        .ctx
        .set_stroke(vello_cpu::kurbo::Stroke::new(LINE_WIDTH));
    layer.ctx.set_paint(color_to_cpu(ACCENT));
    layer.ctx.stroke_rect(&rect_to_cpu(o.rect()));

    let rot = rotation_handle_local(o, m);
    let mut guide = BezPath::new();
    guide.move_to(overlay_handle_local(o, OverlayHandle::N));
    guide.line_to(rot);
    layer.ctx.stroke_path(&bezpath_to_cpu(&guide));

    for handle in OverlayHandle::ALL {
        let c = overlay_handle_local(o, handle);
        handle_square(layer, Rect::from_center_size(c, (m.size, m.size)));
    }

    let knob = kurbo::Circle::new(rot, m.size / 2.0).to_path(0.1);
    layer.ctx.set_paint(color_to_cpu(HANDLE_FILL));
    layer.ctx.fill_path(&bezpath_to_cpu(&knob));
    layer.ctx.set_paint(color_to_cpu(ACCENT));
    layer.ctx.stroke_path(&bezpath_to_cpu(&knob));

    layer.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

/// Body outline, both width handles, and a readout of the current width above the box.
pub(crate) fn draw_text_selection(
    layer: &mut Layer,
    shaper: &mut TextShaper,
    tb: &TextBox,
    m: &HandleMetrics,
    face: Option<&FontFace>,
) -> CaptionResult<()> {
    layer.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    layer
        .ctx
        .set_stroke(vello_cpu::kurbo::Stroke::new(LINE_WIDTH));
    layer.ctx.set_paint(color_to_cpu(ACCENT));
    let body = tb.body_rect();
    layer.ctx.stroke_rect(&rect_to_cpu(body));
    for side in [Side::Left, Side::Right] {
        handle_square(layer, text_handle_rect(tb, side, m.size));
    }

    let Some(face) = face else {
        return Ok(());
    };
    let text = format!("{}px", tb.width.round());
    let mut label = Label {
        text: &text,
        x: 0.0,
        baseline: body.y0 - 6.0,
        size: READOUT_SIZE,
        color: ACCENT,
    };
    let w = f64::from(label.width(shaper, face)?);
    label.x = (body.x0 + body.x1) / 2.0 - w / 2.0;
    label.draw(layer, shaper, face)
}
