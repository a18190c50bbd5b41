use crate::assets::cache::SourceKey;
use crate::config::EditorConfig;
use crate::foundation::core::{Affine, Point, Rect, SurfaceSize};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::math::{clamp_loose, normalize_degrees};
use crate::scene::model::{
    BoxOrigin, ImageOverlay, OverlayHandle, OverlayId, Selection, Side, Stroke, Template,
    TextBox, TextBoxId, TextStyle,
};

/// Geometry limits applied by every scene mutator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLimits {
    pub min_text_width: f64,
    pub min_overlay_size: f64,
    pub text_overscroll: f64,
    pub overlay_initial_fraction: f64,
}

impl SceneLimits {
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self {
            min_text_width: cfg.min_text_width,
            min_overlay_size: cfg.min_overlay_size,
            text_overscroll: cfg.text_drag_overscroll,
            overlay_initial_fraction: cfg.overlay_initial_fraction,
        }
    }
}

impl Default for SceneLimits {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// The editing session's single source of truth.
///
/// Text boxes and overlays are ordered by z-order (later entries on top). Every geometry mutation
/// is clamped against the surface before it is committed. Until the base image has been decoded
/// the surface is unknown and only the lower bounds apply.
#[derive(Clone, Debug)]
pub struct Scene {
    base: SourceKey,
    surface: Option<SurfaceSize>,
    text_boxes: Vec<TextBox>,
    overlays: Vec<ImageOverlay>,
    strokes: Vec<Stroke>,
    selection: Selection,
    limits: SceneLimits,
    next_text_id: u32,
    next_overlay_id: u32,
}

impl Scene {
    /// Build a scene from a template. Template boxes start empty and cannot be removed.
    pub fn from_template(template: &Template, cfg: &EditorConfig) -> Self {
        let mut scene = Self {
            base: SourceKey::new(template.image.as_str()),
            surface: None,
            text_boxes: Vec::with_capacity(template.text_boxes.len()),
            overlays: Vec::new(),
            strokes: Vec::new(),
            selection: Selection::None,
            limits: SceneLimits::from_config(cfg),
            next_text_id: 0,
            next_overlay_id: 0,
        };

        for tb in &template.text_boxes {
            let id = scene.alloc_text_id();
            let mut style = cfg.default_style.clone();
            style.font_size = tb.font_size.max(1.0);
            let max_font_size = style.font_size;
            let min_font_size = tb
                .min_font
                .unwrap_or(cfg.default_min_font_size)
                .clamp(1.0, max_font_size);
            scene.text_boxes.push(TextBox {
                id,
                origin: BoxOrigin::Template,
                label: tb.id.clone(),
                x: tb.x,
                y: tb.y,
                width: tb.width.max(1.0),
                height: tb.height.max(1.0),
                max_font_size,
                min_font_size,
                align: tb.align,
                vertical_align: tb.vertical_align,
                style,
                text: String::new(),
            });
        }
        scene
    }

    pub fn base(&self) -> &SourceKey {
        &self.base
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    pub fn limits(&self) -> SceneLimits {
        self.limits
    }

    /// Point the scene at a (decoded) base image; the surface adopts its intrinsic size.
    pub fn set_base(&mut self, base: SourceKey, surface: SurfaceSize) {
        self.base = base;
        self.surface = Some(surface);
    }

    pub fn text_boxes(&self) -> &[TextBox] {
        &self.text_boxes
    }

    pub fn overlays(&self) -> &[ImageOverlay] {
        &self.overlays
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Replace the selection. Out-of-range indices select nothing.
    pub fn select(&mut self, selection: Selection) {
        self.selection = match selection {
            Selection::Text(i) if i < self.text_boxes.len() => selection,
            Selection::Overlay(i) if i < self.overlays.len() => selection,
            _ => Selection::None,
        };
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    pub fn selected_text_box(&self) -> Option<&TextBox> {
        self.selection.text().and_then(|i| self.text_boxes.get(i))
    }

    pub fn selected_overlay(&self) -> Option<&ImageOverlay> {
        self.selection.overlay().and_then(|i| self.overlays.get(i))
    }

    pub fn text_index(&self, id: TextBoxId) -> Option<usize> {
        self.text_boxes.iter().position(|b| b.id == id)
    }

    pub fn overlay_index(&self, id: OverlayId) -> Option<usize> {
        self.overlays.iter().position(|o| o.id == id)
    }

    pub fn text_box(&self, id: TextBoxId) -> Option<&TextBox> {
        self.text_boxes.iter().find(|b| b.id == id)
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&ImageOverlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    fn text_box_mut(&mut self, id: TextBoxId) -> CaptionResult<&mut TextBox> {
        self.text_boxes
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| CaptionError::invariant(format!("unknown text box {}", id.0)))
    }

    fn overlay_mut(&mut self, id: OverlayId) -> CaptionResult<&mut ImageOverlay> {
        self.overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| CaptionError::invariant(format!("unknown overlay {}", id.0)))
    }

    fn extent(&self) -> (f64, f64) {
        match self.surface {
            Some(s) => (s.width_f(), s.height_f()),
            None => (f64::INFINITY, f64::INFINITY),
        }
    }

    fn alloc_text_id(&mut self) -> TextBoxId {
        let id = TextBoxId(self.next_text_id);
        self.next_text_id += 1;
        id
    }

    fn alloc_overlay_id(&mut self) -> OverlayId {
        let id = OverlayId(self.next_overlay_id);
        self.next_overlay_id += 1;
        id
    }

    // ---- text boxes ----

    pub fn set_text(&mut self, id: TextBoxId, text: impl Into<String>) -> CaptionResult<()> {
        self.text_box_mut(id)?.text = text.into();
        Ok(())
    }

    /// Apply a style edit. The style's font size becomes the box's fitting upper bound.
    pub fn update_style(
        &mut self,
        id: TextBoxId,
        f: impl FnOnce(&mut TextStyle),
    ) -> CaptionResult<()> {
        let tb = self.text_box_mut(id)?;
        f(&mut tb.style);
        if !tb.style.font_size.is_finite() {
            tb.style.font_size = tb.max_font_size;
        }
        let size = tb.style.font_size;
        tb.set_font_size(size);
        tb.style.outline.width = tb.style.outline.width.max(0.0);
        tb.style.shadow.blur = tb.style.shadow.blur.max(0.0);
        Ok(())
    }

    /// Move a text box so its left edge is at `x` and its first baseline at `y`.
    pub fn move_text_box(&mut self, id: TextBoxId, x: f64, y: f64) -> CaptionResult<()> {
        let (w, h) = self.extent();
        let o = self.limits.text_overscroll;
        let tb = self.text_box_mut(id)?;
        tb.x = clamp_loose(x, -o, w - tb.width + o);
        tb.y = clamp_loose(y, f64::from(tb.max_font_size) - o, h + o);
        Ok(())
    }

    /// Resize a text box horizontally from one side, holding the opposite edge fixed.
    pub fn resize_text_box_width(
        &mut self,
        id: TextBoxId,
        width: f64,
        side: Side,
    ) -> CaptionResult<()> {
        let (surface_w, _) = self.extent();
        let min = self.limits.min_text_width;
        let tb = self.text_box_mut(id)?;
        match side {
            Side::Left => {
                let right = tb.right();
                let width = clamp_loose(width, min, right.max(min));
                tb.width = width;
                tb.x = right - width;
            }
            Side::Right => {
                let cap = (surface_w - tb.x).max(min);
                tb.width = clamp_loose(width, min, cap);
            }
        }
        Ok(())
    }

    /// Append a user box roughly in the middle of the surface and return its id.
    pub fn add_text_box(&mut self, style: TextStyle, min_font_size: f32) -> TextBoxId {
        let (w, h) = match self.surface {
            Some(s) => (s.width_f(), s.height_f()),
            None => (400.0, 400.0),
        };
        let width = (w * 0.8).max(self.limits.min_text_width);
        let height = (h * 0.2).max(1.0);
        let max_font_size = style.font_size.max(1.0);
        let id = self.alloc_text_id();
        self.text_boxes.push(TextBox {
            id,
            origin: BoxOrigin::User,
            label: None,
            x: ((w - width) / 2.0).max(0.0),
            y: (h / 2.0).max(f64::from(max_font_size)),
            width,
            height,
            max_font_size,
            min_font_size: min_font_size.clamp(1.0, max_font_size),
            align: Default::default(),
            vertical_align: None,
            style,
            text: String::new(),
        });
        id
    }

    /// Remove a user-added box. Template boxes are rejected and the scene is left unchanged.
    pub fn remove_text_box(&mut self, id: TextBoxId) -> CaptionResult<TextBox> {
        let i = self
            .text_index(id)
            .ok_or_else(|| CaptionError::invariant(format!("unknown text box {}", id.0)))?;
        if self.text_boxes[i].is_template() {
            return Err(CaptionError::invariant("template text boxes cannot be removed"));
        }
        let removed = self.text_boxes.remove(i);
        self.selection = match self.selection {
            Selection::Text(s) if s == i => Selection::None,
            Selection::Text(s) if s > i => Selection::Text(s - 1),
            other => other,
        };
        Ok(removed)
    }

    // ---- overlays ----

    /// Add an overlay scaled to fit within a fraction of the surface, centered, and return its id.
    pub fn add_overlay(
        &mut self,
        source: SourceKey,
        original_width: u32,
        original_height: u32,
    ) -> CaptionResult<OverlayId> {
        let surface = self
            .surface
            .ok_or_else(|| CaptionError::invariant("base image is not loaded yet"))?;
        if original_width == 0 || original_height == 0 {
            return Err(CaptionError::invariant("overlay image has zero size"));
        }
        let min = self.limits.min_overlay_size;
        let target = (surface.min_side() * self.limits.overlay_initial_fraction).max(min);
        let ow = f64::from(original_width);
        let oh = f64::from(original_height);
        let scale = (target / ow).min(target / oh);
        let width = (ow * scale).max(min);
        let height = (oh * scale).max(min);

        let id = self.alloc_overlay_id();
        self.overlays.push(ImageOverlay {
            id,
            source,
            x: ((surface.width_f() - width) / 2.0).max(0.0),
            y: ((surface.height_f() - height) / 2.0).max(0.0),
            width,
            height,
            original_width,
            original_height,
            opacity: 1.0,
            rotation_deg: 0.0,
        });
        Ok(id)
    }

    pub fn remove_overlay(&mut self, id: OverlayId) -> CaptionResult<ImageOverlay> {
        let i = self
            .overlay_index(id)
            .ok_or_else(|| CaptionError::invariant(format!("unknown overlay {}", id.0)))?;
        let removed = self.overlays.remove(i);
        self.selection = match self.selection {
            Selection::Overlay(s) if s == i => Selection::None,
            Selection::Overlay(s) if s > i => Selection::Overlay(s - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Swap the image behind an overlay, keeping its geometry.
    pub fn set_overlay_source(
        &mut self,
        id: OverlayId,
        source: SourceKey,
        original_width: u32,
        original_height: u32,
    ) -> CaptionResult<()> {
        let o = self.overlay_mut(id)?;
        o.source = source;
        o.original_width = original_width;
        o.original_height = original_height;
        Ok(())
    }

    /// Move an overlay; it always stays fully inside the surface.
    pub fn move_overlay(&mut self, id: OverlayId, x: f64, y: f64) -> CaptionResult<()> {
        let (w, h) = self.extent();
        let o = self.overlay_mut(id)?;
        o.x = clamp_loose(x, 0.0, w - o.width);
        o.y = clamp_loose(y, 0.0, h - o.height);
        Ok(())
    }

    /// Resize an overlay by dragging `handle` by `(dx, dy)` from its current geometry.
    pub fn resize_overlay(
        &mut self,
        id: OverlayId,
        handle: OverlayHandle,
        dx: f64,
        dy: f64,
    ) -> CaptionResult<()> {
        let rect = self
            .overlay(id)
            .map(ImageOverlay::rect)
            .ok_or_else(|| CaptionError::invariant(format!("unknown overlay {}", id.0)))?;
        self.resize_overlay_from(id, rect, handle, dx, dy)
    }

    /// Resize relative to the geometry captured when the handle was grabbed.
    pub fn resize_overlay_from(
        &mut self,
        id: OverlayId,
        grabbed: Rect,
        handle: OverlayHandle,
        dx: f64,
        dy: f64,
    ) -> CaptionResult<()> {
        let (w, h) = self.extent();
        let min = self.limits.min_overlay_size;
        let r = resized_overlay_rect(grabbed, handle, dx, dy, w, h, min);
        let o = self.overlay_mut(id)?;

        // The rect rotates about its own center, so the opposite handle has to be pinned in
        // surface space.
        let (ux, uy) = handle.unit_anchor();
        let anchor = (1.0 - ux, 1.0 - uy);
        let shift = rotated_point(grabbed, o.rotation_deg, anchor)
            - rotated_point(r, o.rotation_deg, anchor);
        o.width = r.width();
        o.height = r.height();
        o.x = clamp_loose(r.x0 + shift.x, 0.0, w - o.width);
        o.y = clamp_loose(r.y0 + shift.y, 0.0, h - o.height);
        Ok(())
    }

    /// Set the absolute rotation in degrees (normalised into `[0, 360)`).
    pub fn rotate_overlay(&mut self, id: OverlayId, angle_deg: f64) -> CaptionResult<()> {
        let o = self.overlay_mut(id)?;
        if angle_deg.is_finite() {
            o.rotation_deg = normalize_degrees(angle_deg);
        }
        Ok(())
    }

    pub fn set_overlay_opacity(&mut self, id: OverlayId, opacity: f32) -> CaptionResult<()> {
        let o = self.overlay_mut(id)?;
        o.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Ok(())
    }

    // ---- ink ----

    /// Commit a finished stroke. Empty strokes are dropped.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        if !stroke.points.is_empty() {
            self.strokes.push(stroke);
        }
    }

    pub fn undo_stroke(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn clear_strokes(&mut self) {
        self.strokes.clear();
    }
}

/// Apply a handle drag to `r`, anchoring the opposite edges and keeping the result on-surface.
///
/// An edge that would cross the surface origin is pinned to zero and the dimension shrinks by the
/// overshoot; the far edges are capped at `surface_w` / `surface_h`. Both dimensions end at least
/// `min`.
pub(crate) fn resized_overlay_rect(
    r: Rect,
    handle: OverlayHandle,
    dx: f64,
    dy: f64,
    surface_w: f64,
    surface_h: f64,
    min: f64,
) -> Rect {
    let (mut x, mut y) = (r.x0, r.y0);
    let (mut w, mut h) = (r.width(), r.height());

    if handle.moves_left() {
        let right = x + w;
        x += dx;
        w -= dx;
        if w < min {
            w = min;
            x = right - min;
        }
        if x < 0.0 {
            w += x;
            x = 0.0;
        }
    }
    if handle.moves_right() {
        w = (w + dx).max(min);
        if x + w > surface_w {
            w = surface_w - x;
        }
    }
    if handle.moves_top() {
        let bottom = y + h;
        y += dy;
        h -= dy;
        if h < min {
            h = min;
            y = bottom - min;
        }
        if y < 0.0 {
            h += y;
            y = 0.0;
        }
    }
    if handle.moves_bottom() {
        h = (h + dy).max(min);
        if y + h > surface_h {
            h = surface_h - y;
        }
    }

    let w = w.max(min);
    let h = h.max(min);
    Rect::new(x, y, x + w, y + h)
}

/// Surface position of the unit point `(ux, uy)` of `r` rotated by `rotation_deg` about its center.
fn rotated_point(r: Rect, rotation_deg: f64, (ux, uy): (f64, f64)) -> Point {
    let c = r.center().to_vec2();
    let p = Point::new(r.x0 + ux * r.width(), r.y0 + uy * r.height());
    Affine::translate(c) * Affine::rotate(rotation_deg.to_radians()) * Affine::translate(-c) * p
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scene.rs"]
mod tests;
