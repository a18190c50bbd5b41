//! Turning a frame into shareable output: PNG bytes, a named download, or a clipboard image.

use crate::assets::decode::premultiply_rgba8_in_place;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::pipeline::Frame;
use anyhow::Context;
use std::io::Cursor;

pub const PNG_MIME: &str = "image/png";

/// Convert premultiplied RGBA8 back to straight alpha.
pub fn unpremultiply_rgba8(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Encode `frame` as PNG. Output depends only on the pixels.
#[tracing::instrument(level = "debug", skip(frame), fields(width = frame.width, height = frame.height))]
pub fn rasterize(frame: &Frame) -> CaptionResult<Vec<u8>> {
    let rgba = unpremultiply_rgba8(&frame.rgba8_premul);
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| CaptionError::encode("frame buffer does not match its dimensions"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| CaptionError::encode(format!("{e:#}")))?;
    Ok(out.into_inner())
}

/// An encoded image ready to be saved under a fixed name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn mime(&self) -> &'static str {
        PNG_MIME
    }
}

/// File name with the `.png` extension forced.
pub fn png_file_name(name: &str) -> String {
    let stem = name.trim();
    let stem = match stem.rsplit_once('.') {
        Some((s, _)) if !s.is_empty() => s,
        _ => stem,
    };
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{stem}.png")
}

/// Straight-alpha RGBA8 pixels as exchanged with a system clipboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipboardPixels {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

/// Image written to the clipboard, offered both encoded and as raw pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipboardImage {
    pub png: Vec<u8>,
    pub pixels: ClipboardPixels,
}

impl ClipboardImage {
    pub fn from_frame(frame: &Frame) -> CaptionResult<Self> {
        Ok(Self {
            png: rasterize(frame)?,
            pixels: ClipboardPixels {
                width: frame.width,
                height: frame.height,
                rgba8: unpremultiply_rgba8(&frame.rgba8_premul),
            },
        })
    }
}

/// What a clipboard read produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardPayload {
    /// An encoded blob with an optional MIME type (validated like an upload).
    Encoded { bytes: Vec<u8>, mime: Option<String> },
    Pixels(ClipboardPixels),
}

impl ClipboardPixels {
    /// Premultiplied copy for the image cache.
    pub(crate) fn to_premul(&self) -> CaptionResult<Vec<u8>> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.rgba8.len() != expected {
            return Err(CaptionError::decode("clipboard image has inconsistent dimensions"));
        }
        let mut out = self.rgba8.clone();
        premultiply_rgba8_in_place(&mut out);
        Ok(out)
    }
}

/// Somewhere an exported image can be written. Failures are [`CaptionError::Capability`].
pub trait ClipboardSink {
    fn write_image(&mut self, image: &ClipboardImage) -> CaptionResult<()>;
}

/// Somewhere a pasted image can be read from. `Ok(None)` means the clipboard holds no image.
pub trait ClipboardSource {
    fn read_image(&mut self) -> CaptionResult<Option<ClipboardPayload>>;
}

/// The operating system clipboard.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    pub fn new() -> CaptionResult<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| CaptionError::capability(format!("clipboard unavailable: {e}")))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardSink for SystemClipboard {
    fn write_image(&mut self, image: &ClipboardImage) -> CaptionResult<()> {
        let data = arboard::ImageData {
            width: image.pixels.width as usize,
            height: image.pixels.height as usize,
            bytes: std::borrow::Cow::Borrowed(&image.pixels.rgba8),
        };
        self.inner
            .set_image(data)
            .map_err(|e| CaptionError::capability(format!("clipboard write failed: {e}")))
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardSource for SystemClipboard {
    fn read_image(&mut self) -> CaptionResult<Option<ClipboardPayload>> {
        match self.inner.get_image() {
            Ok(img) => Ok(Some(ClipboardPayload::Pixels(ClipboardPixels {
                width: img.width as u32,
                height: img.height as u32,
                rgba8: img.bytes.into_owned(),
            }))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(CaptionError::capability(format!("clipboard read failed: {e}"))),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/export/export.rs"]
mod tests;
