use std::sync::Arc;

use anyhow::Context;

use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_pixel_size};
use crate::foundation::error::{CaptionError, CaptionResult};

/// A decoded bitmap in premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// What a payload turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    Raster,
    Svg,
}

/// Classify a payload from its MIME hint and magic bytes.
///
/// A MIME hint outside `image/*` is rejected outright. Without a usable hint the bytes must
/// carry a known raster signature or look like SVG markup.
pub fn sniff_payload(bytes: &[u8], mime: Option<&str>) -> CaptionResult<PayloadKind> {
    if let Some(m) = mime {
        let m = m.trim().to_ascii_lowercase();
        if !m.starts_with("image/") {
            return Err(CaptionError::input(format!(
                "\"{m}\" is not an image; please pick an image file"
            )));
        }
        if m.starts_with("image/svg") {
            return Ok(PayloadKind::Svg);
        }
    }
    if bytes.is_empty() {
        return Err(CaptionError::input("empty image payload"));
    }
    if image::guess_format(bytes).is_ok() {
        return Ok(PayloadKind::Raster);
    }
    if looks_like_svg(bytes) {
        return Ok(PayloadKind::Svg);
    }
    Err(CaptionError::input(
        "unrecognised image data; please pick an image file",
    ))
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Sniff and decode any supported payload.
pub fn decode_payload(bytes: &[u8], mime: Option<&str>) -> CaptionResult<DecodedImage> {
    match sniff_payload(bytes, mime)? {
        PayloadKind::Raster => decode_image(bytes),
        PayloadKind::Svg => decode_svg(bytes),
    }
}

pub fn decode_image(bytes: &[u8]) -> CaptionResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| CaptionError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptionError::decode("image has zero size"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse and rasterise an SVG at its intrinsic size.
pub fn decode_svg(bytes: &[u8]) -> CaptionResult<DecodedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(|e| CaptionError::decode(format!("{e:#}")))?;
    let (width, height) = svg_pixel_size(&tree)?;
    let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, width, height)?;
    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
