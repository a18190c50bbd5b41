use crate::config::EditorConfig;
use crate::foundation::core::{Affine, Point, Rect, SurfaceSize, Vec2};
use crate::interact::input::PointerKind;
use crate::scene::model::{ImageOverlay, OverlayHandle, Side, TextBox};
use crate::scene::scene::Scene;

/// Handle geometry for one surface.
///
/// `size` is the drawn handle edge; `hit_size` is the reachable area, enlarged for touch input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleMetrics {
    pub size: f64,
    pub hit_size: f64,
    /// Distance of the rotation handle's center above the overlay's top edge.
    pub rotation_offset: f64,
}

impl HandleMetrics {
    pub fn new(surface: SurfaceSize, cfg: &EditorConfig, pointer: PointerKind) -> Self {
        let size = (surface.min_side() * cfg.handle_size_ratio).max(cfg.handle_min_size);
        let hit_size = match pointer {
            PointerKind::Mouse => size,
            PointerKind::Touch => size * cfg.touch_handle_multiplier.max(1.0),
        };
        Self {
            size,
            hit_size,
            rotation_offset: cfg.rotation_handle_offset.max(size * 1.5),
        }
    }

    pub fn for_mouse(surface: SurfaceSize, cfg: &EditorConfig) -> Self {
        Self::new(surface, cfg, PointerKind::Mouse)
    }
}

/// What a pointer-down at a surface point would grab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    None,
    OverlayHandle { index: usize, handle: OverlayHandle },
    OverlayRotate { index: usize },
    Overlay { index: usize },
    TextWidthHandle { index: usize, side: Side },
    Text { index: usize },
}

/// Rotation about the overlay's center, clockwise in surface space.
pub fn overlay_transform(o: &ImageOverlay) -> Affine {
    let c = o.center().to_vec2();
    Affine::translate(c) * Affine::rotate(o.rotation_deg.to_radians()) * Affine::translate(-c)
}

/// Map a surface point into the overlay's unrotated frame.
pub fn to_overlay_local(o: &ImageOverlay, p: Point) -> Point {
    overlay_transform(o).inverse() * p
}

/// Handle center in the overlay's unrotated frame.
pub fn overlay_handle_local(o: &ImageOverlay, handle: OverlayHandle) -> Point {
    let (ux, uy) = handle.unit_anchor();
    Point::new(o.x + ux * o.width, o.y + uy * o.height)
}

/// Rotation handle center in the overlay's unrotated frame.
pub fn rotation_handle_local(o: &ImageOverlay, metrics: &HandleMetrics) -> Point {
    Point::new(o.x + o.width / 2.0, o.y - metrics.rotation_offset)
}

/// Width handle rectangle of a text box, centered on the edge at mid-body height.
pub fn text_handle_rect(tb: &TextBox, side: Side, edge: f64) -> Rect {
    let body = tb.body_rect();
    let cx = match side {
        Side::Left => body.x0,
        Side::Right => body.x1,
    };
    let cy = (body.y0 + body.y1) / 2.0;
    Rect::from_center_size(Point::new(cx, cy), (edge, edge * 2.0))
}

fn square_contains(center: Point, edge: f64, p: Point) -> bool {
    let half = edge / 2.0;
    (p.x - center.x).abs() <= half && (p.y - center.y).abs() <= half
}

fn hit_selected_overlay(scene: &Scene, p: Point, m: &HandleMetrics) -> Option<HitTarget> {
    let index = scene.selection().overlay()?;
    let o = scene.overlays().get(index)?;
    let local = to_overlay_local(o, p);

    let rot = rotation_handle_local(o, m);
    if (local - rot).hypot() <= m.hit_size {
        return Some(HitTarget::OverlayRotate { index });
    }
    OverlayHandle::ALL
        .into_iter()
        .find(|h| square_contains(overlay_handle_local(o, *h), m.hit_size, local))
        .map(|handle| HitTarget::OverlayHandle { index, handle })
}

fn hit_selected_text(scene: &Scene, p: Point, m: &HandleMetrics) -> Option<HitTarget> {
    let index = scene.selection().text()?;
    let tb = scene.text_boxes().get(index).filter(|tb| tb.has_text())?;
    [Side::Left, Side::Right]
        .into_iter()
        .find(|side| text_handle_rect(tb, *side, m.hit_size).contains(p))
        .map(|side| HitTarget::TextWidthHandle { index, side })
}

/// Resolve what lies under `p`, in priority order: the selected overlay's handles, overlay
/// bodies (topmost first), the selected text box's width handles, then non-empty text bodies
/// (topmost first).
///
/// Pure: the result depends only on `p`, entity geometry and the current selection.
pub fn hit_test(scene: &Scene, p: Point, metrics: &HandleMetrics) -> HitTarget {
    if let Some(hit) = hit_selected_overlay(scene, p, metrics) {
        return hit;
    }
    if let Some(index) = scene
        .overlays()
        .iter()
        .rposition(|o| o.rect().contains(to_overlay_local(o, p)))
    {
        return HitTarget::Overlay { index };
    }
    if let Some(hit) = hit_selected_text(scene, p, metrics) {
        return hit;
    }
    if let Some(index) = scene
        .text_boxes()
        .iter()
        .rposition(|tb| tb.has_text() && tb.body_rect().contains(p))
    {
        return HitTarget::Text { index };
    }
    HitTarget::None
}

/// Signed angle of `p` around `center`, in degrees.
pub(crate) fn angle_deg(center: Point, p: Point) -> f64 {
    let v: Vec2 = p - center;
    v.y.atan2(v.x).to_degrees()
}

#[cfg(test)]
#[path = "../../tests/unit/interact/hit.rs"]
mod tests;
