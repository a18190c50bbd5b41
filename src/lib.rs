#![forbid(unsafe_code)]
//! Caption-image editor core: a scene of text boxes, image overlays and ink strokes over a base
//! picture, with auto-fitting text, pointer-driven editing and deterministic PNG export.
//!
//! The host supplies bytes (images, fonts) and pointer samples; [`EditorSession`] owns the
//! state and produces frames.

pub mod assets;
pub mod config;
pub mod export;
pub mod foundation;
pub mod ink;
pub mod interact;
pub mod layout;
pub mod render;
pub mod scene;
pub mod session;

pub use assets::cache::SourceKey;
pub use assets::loads::LoadTicket;
pub use config::{EditorConfig, InkConfig, WatermarkConfig};
pub use export::{ClipboardImage, ClipboardPayload, ClipboardSink, ClipboardSource, Download};
pub use foundation::core::{Point, Rect, Rgba8, SurfaceSize, Vec2};
pub use foundation::error::{CaptionError, CaptionResult, ErrorKind};
pub use interact::input::{DisplayMapping, PointerEvent, PointerKind, PointerPhase};
pub use interact::machine::{CursorHint, Mode};
pub use render::pipeline::Frame;
pub use scene::model::{
    Align, ImageOverlay, OverlayId, Selection, Stroke, Template, TextBox, TextBoxId, TextCase,
    TextStyle, VerticalAlign,
};
pub use scene::scene::Scene;
pub use session::{EditorSession, FontRequest, Key, Notice, NoticeLevel, RedrawOutcome, ResetSignal};

#[cfg(feature = "system-clipboard")]
pub use export::SystemClipboard;
