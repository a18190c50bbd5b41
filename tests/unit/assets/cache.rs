use std::io::Cursor;

use super::*;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn first_decode_wins() {
    let mut cache = ImageCache::new();
    let key = SourceKey::new("cat.png");

    let a = cache
        .get_or_decode(&key, &png(2, 2, [255, 0, 0, 255]), None)
        .unwrap();
    let b = cache
        .get_or_decode(&key, &png(3, 3, [0, 255, 0, 255]), None)
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(b.width, 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn insert_returns_existing_entry() {
    let mut cache = ImageCache::new();
    let key = SourceKey::new("k");
    let first = DecodedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![1, 2, 3, 4]),
    };
    let second = DecodedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![9, 9, 9, 9]),
    };
    cache.insert(key.clone(), first.clone());
    let got = cache.insert(key.clone(), second);
    assert_eq!(*got, first);
}

#[test]
fn failed_decode_leaves_cache_untouched() {
    let mut cache = ImageCache::new();
    let key = SourceKey::new("bad");
    assert!(cache.get_or_decode(&key, b"nope", None).is_err());
    assert!(!cache.contains(&key));
    assert!(cache.is_empty());
}
