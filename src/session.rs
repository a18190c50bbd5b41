//! The editing session: one scene plus everything needed to edit, draw and export it.

use crate::assets::cache::{ImageCache, SourceKey};
use crate::assets::decode::DecodedImage;
use crate::assets::fonts::FontBook;
use crate::assets::loads::{LoadSlot, LoadTicket, LoadTracker};
use crate::config::EditorConfig;
use crate::export::{
    png_file_name, rasterize, ClipboardImage, ClipboardPayload, ClipboardSink, ClipboardSource,
    Download,
};
use crate::foundation::core::{Point, Rgba8, SurfaceSize};
use crate::foundation::error::{CaptionError, CaptionResult, ErrorKind};
use crate::ink::InkTool;
use crate::interact::hit::HandleMetrics;
use crate::interact::input::{DisplayMapping, PointerEvent, PointerKind, PointerPhase};
use crate::interact::machine::{CursorHint, InteractionMachine, InteractionState, Mode};
use crate::render::pipeline::{Frame, FrameInput, FrameRenderer};
use crate::render::throttle::{Gate, RedrawThrottle};
use crate::scene::model::{OverlayId, Selection, Template, TextBoxId, TextStyle};
use crate::scene::scene::Scene;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A non-blocking message for the user. Failures never end the session; they become notices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Keys the editing surface reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
}

/// Result of [`EditorSession::redraw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedrawOutcome {
    Drawn,
    /// Nothing changed since the last frame.
    Clean,
    /// Too soon after the previous draw; call again at `until`.
    Throttled { until: Duration },
    /// A requested font face may still arrive; call again at `until`.
    Deferred { until: Duration },
    /// The base image has not been decoded yet.
    NotReady,
    /// Drawing failed; a notice was queued and the previous frame kept.
    Failed,
}

/// Returned by [`EditorSession::reset`]: the host should leave the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetSignal;

/// A font face the host should fetch and hand to [`EditorSession::provide_font`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontRequest {
    pub family: String,
    pub weight: u16,
}

pub struct EditorSession {
    config: EditorConfig,
    template: Template,
    scene: Scene,
    machine: InteractionMachine,
    ink: InkTool,
    fonts: FontBook,
    images: ImageCache,
    loads: LoadTracker,
    renderer: FrameRenderer,
    throttle: RedrawThrottle,
    mapping: Option<DisplayMapping>,
    notices: Vec<Notice>,
    frame: Option<Frame>,
    dirty: bool,
    force_next: bool,
    clock: Duration,
    next_paste: u64,
}

impl EditorSession {
    pub fn new(template: Template, config: EditorConfig) -> CaptionResult<Self> {
        config.validate()?;
        tracing::info!(
            image = %template.image,
            text_boxes = template.text_boxes.len(),
            "editor session started"
        );
        Ok(Self {
            scene: Scene::from_template(&template, &config),
            machine: InteractionMachine::new(),
            ink: InkTool::from_config(&config.ink),
            fonts: FontBook::new(config.font_fallbacks.clone(), config.font_settle_timeout()),
            images: ImageCache::new(),
            loads: LoadTracker::new(),
            renderer: FrameRenderer::new(&config),
            throttle: RedrawThrottle::new(config.redraw_throttle()),
            mapping: None,
            notices: Vec::new(),
            frame: None,
            dirty: true,
            force_next: true,
            clock: Duration::ZERO,
            next_paste: 0,
            config,
            template,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn ink(&self) -> &InkTool {
        &self.ink
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    pub fn interaction(&self) -> &InteractionState {
        self.machine.state()
    }

    pub fn is_ready(&self) -> bool {
        self.scene.surface().is_some()
    }

    /// Last frame drawn by [`EditorSession::redraw`], with selection decorations.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Convert a failure into a notice.
    fn report(&mut self, err: CaptionError) {
        let level = match err.kind() {
            ErrorKind::Input | ErrorKind::Invariant | ErrorKind::Capability => NoticeLevel::Warning,
            ErrorKind::Decode | ErrorKind::Config | ErrorKind::Encode | ErrorKind::Other => {
                NoticeLevel::Error
            }
        };
        tracing::warn!(kind = ?err.kind(), "{err}");
        self.notify(level, err.to_string());
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    fn tick(&mut self, now: Duration) {
        self.clock = self.clock.max(now);
    }

    // ---- image loads ----

    /// Ticket for fetching the base image. Hand the bytes to [`EditorSession::complete_load`].
    pub fn base_load(&mut self) -> LoadTicket {
        let source = self.scene.base().clone();
        self.loads.begin(LoadSlot::Base, source, None)
    }

    /// Start loading an image that becomes a new overlay. A non-image MIME type is rejected
    /// immediately.
    pub fn load_overlay(
        &mut self,
        source: impl Into<String>,
        mime: Option<String>,
    ) -> Option<LoadTicket> {
        if let Some(m) = mime.as_deref()
            && let Err(e) = check_image_mime(m)
        {
            self.report(e);
            return None;
        }
        Some(self.loads.begin_new_overlay(SourceKey::new(source), mime))
    }

    /// Start replacing the picture of an existing overlay. A newer request for the same overlay
    /// supersedes this one.
    pub fn replace_overlay_image(
        &mut self,
        id: OverlayId,
        source: impl Into<String>,
        mime: Option<String>,
    ) -> Option<LoadTicket> {
        if self.scene.overlay(id).is_none() {
            self.report(CaptionError::invariant(format!("unknown overlay {}", id.0)));
            return None;
        }
        if let Some(m) = mime.as_deref()
            && let Err(e) = check_image_mime(m)
        {
            self.report(e);
            return None;
        }
        Some(
            self.loads
                .begin(LoadSlot::OverlaySource(id), SourceKey::new(source), mime),
        )
    }

    /// Deliver the bytes for `ticket`. Returns whether the scene changed. Stale tickets are
    /// discarded silently; undecodable data becomes a notice.
    pub fn complete_load(&mut self, ticket: &LoadTicket, bytes: &[u8]) -> bool {
        if !self.loads.accept(ticket) {
            return false;
        }
        let decoded = match self
            .images
            .get_or_decode(&ticket.source, bytes, ticket.mime.as_deref())
        {
            Ok(d) => d,
            Err(e) => {
                self.report(e);
                return false;
            }
        };
        self.apply_image(ticket.slot, ticket.source.clone(), &decoded)
    }

    /// The host could not fetch the bytes at all.
    pub fn fail_load(&mut self, ticket: &LoadTicket, reason: &str) {
        if self.loads.accept(ticket) {
            self.report(CaptionError::decode(format!(
                "could not load \"{}\": {reason}",
                ticket.source
            )));
        }
    }

    fn apply_image(&mut self, slot: LoadSlot, source: SourceKey, img: &DecodedImage) -> bool {
        let applied = match slot {
            LoadSlot::Base => SurfaceSize::new(img.width, img.height).map(|surface| {
                tracing::info!(width = img.width, height = img.height, "base image ready");
                self.scene.set_base(source, surface);
            }),
            LoadSlot::NewOverlay(_) => self
                .scene
                .add_overlay(source, img.width, img.height)
                .map(|id| {
                    if let Some(i) = self.scene.overlay_index(id) {
                        self.scene.select(Selection::Overlay(i));
                    }
                    tracing::debug!(overlay = id.0, "overlay added");
                }),
            LoadSlot::OverlaySource(id) => {
                self.scene
                    .set_overlay_source(id, source, img.width, img.height)
            }
        };
        match applied {
            Ok(()) => {
                self.touch();
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    /// Paste the clipboard's image as a new overlay.
    pub fn paste_overlay_from_clipboard(
        &mut self,
        clipboard: &mut dyn ClipboardSource,
    ) -> Option<OverlayId> {
        let payload = match clipboard.read_image() {
            Ok(Some(p)) => p,
            Ok(None) => {
                self.notify(NoticeLevel::Info, "the clipboard does not contain an image");
                return None;
            }
            Err(e) => {
                self.report(e);
                return None;
            }
        };

        let key = SourceKey::new(format!("clipboard:{}", self.next_paste));
        self.next_paste += 1;
        let decoded = match payload {
            ClipboardPayload::Encoded { bytes, mime } => {
                self.images.get_or_decode(&key, &bytes, mime.as_deref())
            }
            ClipboardPayload::Pixels(px) => px.to_premul().map(|rgba| {
                self.images.insert(
                    key.clone(),
                    DecodedImage {
                        width: px.width,
                        height: px.height,
                        rgba8_premul: Arc::new(rgba),
                    },
                )
            }),
        };
        let decoded = match decoded {
            Ok(d) => d,
            Err(e) => {
                self.report(e);
                return None;
            }
        };
        let before = self.scene.overlays().len();
        if !self.apply_image(LoadSlot::NewOverlay(u64::MAX), key, &decoded) {
            return None;
        }
        self.scene.overlays().get(before).map(|o| o.id)
    }

    // ---- fonts ----

    /// Font faces the current text boxes need that have not been requested yet.
    pub fn wanted_fonts(&mut self, now: Duration) -> Vec<FontRequest> {
        self.tick(now);
        let mut wanted: Vec<(String, u16)> = self
            .scene
            .text_boxes()
            .iter()
            .map(|tb| (tb.style.font_family.clone(), tb.style.font_weight))
            .collect();
        wanted.sort();
        wanted.dedup();
        wanted
            .into_iter()
            .filter(|(family, weight)| self.fonts.request(family, *weight, now))
            .map(|(family, weight)| FontRequest { family, weight })
            .collect()
    }

    /// Register font bytes. Bad font data is logged and the family degrades to the fallback.
    pub fn provide_font(&mut self, family: &str, weight: u16, bytes: Vec<u8>) {
        if let Err(e) = self.fonts.provide(family, weight, bytes) {
            tracing::warn!(family, weight, "font rejected, using fallback: {e}");
        }
        self.touch();
    }

    pub fn fail_font(&mut self, family: &str, weight: u16) {
        self.fonts.fail(family, weight);
        self.touch();
    }

    // ---- text ----

    pub fn set_text(&mut self, id: TextBoxId, text: impl Into<String>) {
        match self.scene.set_text(id, text) {
            Ok(()) => self.touch(),
            Err(e) => self.report(e),
        }
    }

    pub fn update_style(&mut self, id: TextBoxId, f: impl FnOnce(&mut TextStyle)) {
        match self.scene.update_style(id, f) {
            Ok(()) => self.touch(),
            Err(e) => self.report(e),
        }
    }

    /// Add a user text box with the default style and select it.
    pub fn add_text_box(&mut self) -> TextBoxId {
        let id = self.scene.add_text_box(
            self.config.default_style.clone(),
            self.config.default_min_font_size,
        );
        if let Some(i) = self.scene.text_index(id) {
            self.scene.select(Selection::Text(i));
        }
        self.touch();
        id
    }

    /// Remove a user text box. Template boxes are refused with a notice.
    pub fn remove_text_box(&mut self, id: TextBoxId) -> bool {
        match self.scene.remove_text_box(id) {
            Ok(_) => {
                self.touch();
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    pub fn select(&mut self, selection: Selection) {
        if self.scene.selection() != selection {
            self.scene.select(selection);
            self.touch();
        }
    }

    // ---- overlays ----

    pub fn remove_overlay(&mut self, id: OverlayId) -> bool {
        match self.scene.remove_overlay(id) {
            Ok(_) => {
                self.loads.forget(LoadSlot::OverlaySource(id));
                self.touch();
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    pub fn set_overlay_opacity(&mut self, id: OverlayId, opacity: f32) {
        match self.scene.set_overlay_opacity(id, opacity) {
            Ok(()) => self.touch(),
            Err(e) => self.report(e),
        }
    }

    // ---- ink ----

    pub fn set_mode(&mut self, mode: Mode) {
        if self.machine.mode() != mode {
            self.machine.set_mode(mode, &mut self.ink);
            tracing::debug!(?mode, "mode changed");
            self.touch();
        }
    }

    pub fn set_ink_color(&mut self, color: Rgba8) {
        self.ink.set_color(color);
    }

    pub fn set_ink_size(&mut self, size: f64) {
        self.ink.set_size(size);
    }

    pub fn set_eraser(&mut self, eraser: bool) {
        self.ink.set_eraser(eraser);
    }

    pub fn undo_stroke(&mut self) {
        if self.scene.undo_stroke().is_some() {
            self.touch();
        }
    }

    pub fn clear_strokes(&mut self) {
        if !self.scene.strokes().is_empty() {
            self.scene.clear_strokes();
            self.touch();
        }
    }

    // ---- pointer and keyboard ----

    /// Where the surface is displayed. Without one, display and surface coordinates coincide.
    pub fn set_display_mapping(&mut self, mapping: DisplayMapping) {
        self.mapping = Some(mapping);
    }

    fn surface_point(&self, surface: SurfaceSize, event: &PointerEvent) -> Point {
        self.mapping
            .unwrap_or_else(|| DisplayMapping::identity(surface))
            .to_surface(event.position)
    }

    /// Feed a pointer sample. Returns whether the scene changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        self.tick(event.time);
        let Some(surface) = self.scene.surface() else {
            return false;
        };
        if event.is_ignored() {
            return false;
        }
        let p = self.surface_point(surface, &event);
        let metrics = HandleMetrics::new(surface, &self.config, event.kind);
        let outcome = match event.phase {
            PointerPhase::Down => {
                self.machine
                    .pointer_down(&mut self.scene, &mut self.ink, p, &metrics)
            }
            PointerPhase::Move => self.machine.pointer_move(&mut self.scene, &mut self.ink, p),
            PointerPhase::Up | PointerPhase::Cancel | PointerPhase::Leave => {
                self.machine.pointer_up(&mut self.scene, &mut self.ink)
            }
        };
        if outcome.scene_changed {
            self.touch();
        }
        if outcome.gesture_ended {
            self.force_next = true;
            self.touch();
        }
        outcome.scene_changed
    }

    /// Delete/Backspace remove the selected overlay; Escape clears the selection.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Delete | Key::Backspace => match self.scene.selected_overlay().map(|o| o.id) {
                Some(id) => self.remove_overlay(id),
                None => false,
            },
            Key::Escape => {
                if self.scene.selection() == Selection::None {
                    return false;
                }
                self.scene.clear_selection();
                self.touch();
                true
            }
        }
    }

    /// Cursor to show for a hover sample.
    pub fn hover_cursor(&self, event: &PointerEvent) -> CursorHint {
        let Some(surface) = self.scene.surface() else {
            return CursorHint::Default;
        };
        let p = self.surface_point(surface, event);
        let metrics = HandleMetrics::new(surface, &self.config, event.kind);
        self.machine.cursor_hint(&self.scene, p, &metrics)
    }

    // ---- drawing and export ----

    fn render_frame(&mut self, decorations: bool) -> CaptionResult<Frame> {
        let surface = self
            .scene
            .surface()
            .ok_or_else(|| CaptionError::invariant("base image is not loaded yet"))?;
        let input = FrameInput {
            scene: &self.scene,
            images: &self.images,
            fonts: &self.fonts,
            in_progress: self.ink.in_progress(),
            metrics: HandleMetrics::new(surface, &self.config, PointerKind::Mouse),
            decorations,
            now: self.clock,
        };
        self.renderer.render(&input)
    }

    /// Draw the current state if anything changed, honouring the redraw throttle and the font
    /// settle window. The draw after a gesture ends is never throttled.
    pub fn redraw(&mut self, now: Duration) -> RedrawOutcome {
        self.tick(now);
        if !self.is_ready() {
            return RedrawOutcome::NotReady;
        }
        if !self.dirty {
            return RedrawOutcome::Clean;
        }
        let families = self
            .scene
            .text_boxes()
            .iter()
            .filter(|tb| tb.has_text())
            .map(|tb| (tb.style.font_family.as_str(), tb.style.font_weight));
        if let Some(until) = self.fonts.settle_deadline(families, now) {
            return RedrawOutcome::Deferred { until };
        }
        if let Gate::Wait { until } = self.throttle.gate(now, self.force_next) {
            return RedrawOutcome::Throttled { until };
        }

        match self.render_frame(true) {
            Ok(frame) => {
                self.frame = Some(frame);
                self.dirty = false;
                self.force_next = false;
                self.throttle.record(now);
                RedrawOutcome::Drawn
            }
            Err(e) => {
                self.report(e);
                self.dirty = false;
                RedrawOutcome::Failed
            }
        }
    }

    /// Encode the composition as PNG, without selection decorations. Repeated calls on an
    /// unchanged scene return identical bytes.
    pub fn rasterize(&mut self) -> CaptionResult<Vec<u8>> {
        let frame = self.render_frame(false)?;
        let png = rasterize(&frame)?;
        tracing::info!(bytes = png.len(), "composition exported");
        Ok(png)
    }

    pub fn download(&mut self) -> CaptionResult<Download> {
        Ok(Download {
            file_name: png_file_name(&self.config.export_file_name),
            bytes: self.rasterize()?,
        })
    }

    /// Write the composition to `clipboard`. Failures become notices; returns success.
    pub fn copy_to_clipboard(&mut self, clipboard: &mut dyn ClipboardSink) -> bool {
        let written = self
            .render_frame(false)
            .and_then(|frame| ClipboardImage::from_frame(&frame))
            .and_then(|image| clipboard.write_image(&image));
        match written {
            Ok(()) => {
                self.notify(NoticeLevel::Info, "image copied to the clipboard");
                true
            }
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    /// Discard the composition and hand control back to the host.
    pub fn reset(&mut self) -> ResetSignal {
        tracing::info!("editor session reset");
        self.scene = Scene::from_template(&self.template, &self.config);
        self.machine = InteractionMachine::new();
        self.ink.cancel();
        self.loads.clear();
        self.images.clear();
        self.renderer.forget_images();
        self.throttle.reset();
        self.notices.clear();
        self.frame = None;
        self.dirty = true;
        self.force_next = true;
        ResetSignal
    }
}

fn check_image_mime(mime: &str) -> CaptionResult<()> {
    if mime.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(CaptionError::input(format!(
            "\"{mime}\" is not an image; please pick an image file"
        )))
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
