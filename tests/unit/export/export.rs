use super::*;

fn frame() -> Frame {
    Frame {
        width: 2,
        height: 1,
        rgba8_premul: vec![128, 0, 0, 128, 0, 0, 255, 255],
    }
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let out = unpremultiply_rgba8(&[128, 0, 0, 128, 9, 9, 9, 0, 1, 2, 3, 255]);
    assert_eq!(out, vec![255, 0, 0, 128, 0, 0, 0, 0, 1, 2, 3, 255]);
}

#[test]
fn png_round_trips_through_the_image_crate() {
    let png = rasterize(&frame()).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 255, 255]);
}

#[test]
fn encoding_is_deterministic() {
    assert_eq!(rasterize(&frame()).unwrap(), rasterize(&frame()).unwrap());
}

#[test]
fn mismatched_frame_is_an_encode_error() {
    let bad = Frame {
        width: 3,
        height: 3,
        rgba8_premul: vec![0; 4],
    };
    let err = rasterize(&bad).unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Encode);
}

#[test]
fn download_names_always_end_in_png() {
    assert_eq!(png_file_name("meme.png"), "meme.png");
    assert_eq!(png_file_name("meme.jpg"), "meme.png");
    assert_eq!(png_file_name("caption"), "caption.png");
    assert_eq!(png_file_name("  "), "image.png");
}

#[test]
fn clipboard_pixels_are_validated_before_premultiplying() {
    let ok = ClipboardPixels {
        width: 1,
        height: 1,
        rgba8: vec![255, 255, 255, 128],
    };
    assert_eq!(ok.to_premul().unwrap(), vec![128, 128, 128, 128]);
    let bad = ClipboardPixels {
        width: 2,
        height: 2,
        rgba8: vec![0; 4],
    };
    assert!(bad.to_premul().is_err());
}

#[test]
fn clipboard_image_carries_png_and_pixels() {
    let img = ClipboardImage::from_frame(&frame()).unwrap();
    assert_eq!(img.pixels.rgba8[..4], [255, 0, 0, 128]);
    assert_eq!(img.png, rasterize(&frame()).unwrap());
}
