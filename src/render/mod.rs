//! Frame composition on the CPU.
//!
//! Every frame is re-derived from the current scene: base image, watermark, ink, overlays,
//! overlay selection, text, text selection. Each pass is rasterised with `vello_cpu` into an
//! offscreen layer and composited onto the frame buffer in premultiplied RGBA8.

/// Premultiplied byte compositing and blur.
pub mod composite;
pub(crate) mod cpu;
pub(crate) mod decorations;
/// Frame assembly.
pub mod pipeline;
pub(crate) mod text;
/// Redraw rate limiting.
pub mod throttle;
