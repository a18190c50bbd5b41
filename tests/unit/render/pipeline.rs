use super::*;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Point, SurfaceSize};
use crate::scene::model::{Selection, Template, TextCase, TextStyle};

const W: u32 = 40;

fn solid(width: u32, height: u32, px: [u8; 4]) -> DecodedImage {
    DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(px.repeat((width * height) as usize)),
    }
}

fn near(px: Option<[u8; 4]>, want: [u8; 4]) -> bool {
    px.is_some_and(|px| px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 3))
}

struct Rig {
    cfg: EditorConfig,
    scene: Scene,
    images: ImageCache,
    fonts: FontBook,
    renderer: FrameRenderer,
}

impl Rig {
    fn new() -> Self {
        let cfg = EditorConfig::default();
        let template = Template {
            image: "base.png".to_owned(),
            text_boxes: Vec::new(),
        };
        let mut scene = Scene::from_template(&template, &cfg);
        scene.set_base(SourceKey::new("base.png"), SurfaceSize::new(W, W).unwrap());
        let mut images = ImageCache::new();
        images.insert(SourceKey::new("base.png"), solid(W, W, [255, 255, 255, 255]));
        Self {
            renderer: FrameRenderer::new(&cfg),
            fonts: FontBook::new(Vec::new(), Duration::from_secs(2)),
            cfg,
            scene,
            images,
        }
    }

    fn render(&mut self, decorations: bool) -> Frame {
        let metrics = HandleMetrics::for_mouse(SurfaceSize::new(W, W).unwrap(), &self.cfg);
        let input = FrameInput {
            scene: &self.scene,
            images: &self.images,
            fonts: &self.fonts,
            in_progress: None,
            metrics,
            decorations,
            now: Duration::ZERO,
        };
        self.renderer.render(&input).unwrap()
    }

    fn add_blue_overlay(&mut self) {
        let key = SourceKey::new("blue.png");
        self.images.insert(key.clone(), solid(2, 2, [0, 0, 255, 255]));
        self.scene.add_overlay(key, 2, 2).unwrap();
    }

    fn stroke(&mut self, size: f64, is_eraser: bool) {
        self.scene.push_stroke(Stroke {
            points: vec![Point::new(5.0, 5.0), Point::new(35.0, 5.0)],
            color: Rgba8::rgb(255, 0, 0),
            size,
            is_eraser,
        });
    }
}

#[test]
fn base_image_fills_the_frame() {
    let mut rig = Rig::new();
    let frame = rig.render(true);
    assert_eq!((frame.width, frame.height), (W, W));
    assert!(frame.rgba8_premul.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
}

#[test]
fn overlay_is_scaled_into_its_rect() {
    let mut rig = Rig::new();
    rig.add_blue_overlay();
    let o = &rig.scene.overlays()[0];
    assert_eq!((o.x, o.y, o.width, o.height), (10.0, 10.0, 20.0, 20.0));
    let frame = rig.render(false);
    assert!(near(frame.pixel(20, 20), [0, 0, 255, 255]));
    assert_eq!(frame.pixel(2, 2), Some([255, 255, 255, 255]));
}

#[test]
fn overlay_opacity_blends_with_base() {
    let mut rig = Rig::new();
    rig.add_blue_overlay();
    let id = rig.scene.overlays()[0].id;
    rig.scene.set_overlay_opacity(id, 0.5).unwrap();
    let px = rig.render(false).pixel(20, 20).unwrap();
    assert!(near(Some(px), [127, 127, 255, 255]), "{px:?}");
}

#[test]
fn eraser_reveals_what_is_under_the_ink() {
    let mut rig = Rig::new();
    rig.stroke(4.0, false);
    assert!(near(rig.render(false).pixel(20, 5), [255, 0, 0, 255]));
    rig.stroke(8.0, true);
    assert_eq!(rig.render(false).pixel(20, 5), Some([255, 255, 255, 255]));
}

#[test]
fn decorations_only_show_for_a_selection() {
    let mut rig = Rig::new();
    rig.add_blue_overlay();
    assert_eq!(rig.render(true), rig.render(false));
    rig.scene.select(Selection::Overlay(0));
    assert_ne!(rig.render(true), rig.render(false));
}

#[test]
fn rendering_is_deterministic() {
    let mut rig = Rig::new();
    rig.add_blue_overlay();
    rig.stroke(3.0, false);
    let id = rig.scene.overlays()[0].id;
    rig.scene.rotate_overlay(id, 30.0).unwrap();
    assert_eq!(rig.render(false), rig.render(false));
}

#[test]
fn paint_order_is_ink_then_overlays_then_text() {
    let mut rig = Rig::new();
    rig.add_blue_overlay();
    rig.stroke(2.0, false);
    rig.scene.add_text_box(Default::default(), 10.0);
    let live = Stroke {
        points: vec![Point::new(1.0, 1.0)],
        color: Rgba8::BLACK,
        size: 2.0,
        is_eraser: false,
    };
    let order: Vec<&str> = drawables(&rig.scene, Some(&live))
        .iter()
        .map(|d| match d {
            Drawable::Stroke(_) => "stroke",
            Drawable::Overlay(_) => "overlay",
            Drawable::Text(_) => "text",
        })
        .collect();
    assert_eq!(order, ["stroke", "stroke", "overlay", "text"]);
}

#[test]
fn single_point_stroke_is_a_dot() {
    let dot = Stroke {
        points: vec![Point::new(10.0, 10.0)],
        color: Rgba8::BLACK,
        size: 6.0,
        is_eraser: false,
    };
    let path = stroke_outline(&dot).unwrap();
    let bbox = kurbo::Shape::bounding_box(&path);
    assert!((bbox.width() - 6.0).abs() < 1e-6);
    let empty = Stroke {
        points: Vec::new(),
        ..dot
    };
    assert!(stroke_outline(&empty).is_none());
}

#[test]
fn frame_requires_a_loaded_base() {
    let cfg = EditorConfig::default();
    let scene = Scene::from_template(&Template::for_image("x.png", 100, 100), &cfg);
    let images = ImageCache::new();
    let fonts = FontBook::new(Vec::new(), Duration::ZERO);
    let input = FrameInput {
        scene: &scene,
        images: &images,
        fonts: &fonts,
        in_progress: None,
        metrics: HandleMetrics::for_mouse(SurfaceSize::new(100, 100).unwrap(), &cfg),
        decorations: true,
        now: Duration::ZERO,
    };
    assert!(FrameRenderer::new(&cfg).render(&input).is_err());
}

const FONT_PATH: &str = "tests/data/fonts/DejaVuSans.ttf";

/// A 200×80 white surface with a real font face registered.
struct TextRig {
    cfg: EditorConfig,
    scene: Scene,
    images: ImageCache,
    fonts: FontBook,
    renderer: FrameRenderer,
}

impl TextRig {
    fn new(watermark: Option<WatermarkConfig>) -> Self {
        let cfg = EditorConfig {
            watermark,
            ..EditorConfig::default()
        };
        let template = Template {
            image: "base.png".to_owned(),
            text_boxes: Vec::new(),
        };
        let mut scene = Scene::from_template(&template, &cfg);
        scene.set_base(SourceKey::new("base.png"), SurfaceSize::new(200, 80).unwrap());
        let mut images = ImageCache::new();
        images.insert(SourceKey::new("base.png"), solid(200, 80, [255, 255, 255, 255]));
        let mut fonts = FontBook::new(Vec::new(), Duration::from_secs(2));
        fonts
            .provide("DejaVu Sans", 400, std::fs::read(FONT_PATH).unwrap())
            .unwrap();
        Self {
            renderer: FrameRenderer::new(&cfg),
            cfg,
            scene,
            images,
            fonts,
        }
    }

    /// Plain black 32px text with no outline or shadow.
    fn plain_style() -> TextStyle {
        let mut style = TextStyle {
            font_size: 32.0,
            color: Rgba8::BLACK,
            font_family: "DejaVu Sans".to_owned(),
            font_weight: 400,
            text_case: TextCase::AsWritten,
            ..TextStyle::default()
        };
        style.outline.width = 0.0;
        style.shadow.color = Rgba8::TRANSPARENT;
        style
    }

    fn add_text(&mut self, text: &str, style: TextStyle) {
        let id = self.scene.add_text_box(style, 32.0);
        self.scene.set_text(id, text).unwrap();
    }

    fn render(&mut self, decorations: bool) -> Frame {
        let metrics = HandleMetrics::for_mouse(SurfaceSize::new(200, 80).unwrap(), &self.cfg);
        let input = FrameInput {
            scene: &self.scene,
            images: &self.images,
            fonts: &self.fonts,
            in_progress: None,
            metrics,
            decorations,
            now: Duration::ZERO,
        };
        self.renderer.render(&input).unwrap()
    }
}

fn pixels_where(frame: &Frame, pred: impl Fn([u8; 4]) -> bool) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for y in 0..frame.height {
        for x in 0..frame.width {
            if frame.pixel(x, y).is_some_and(&pred) {
                out.push((x, y));
            }
        }
    }
    out
}

fn dark(px: [u8; 4]) -> bool {
    px[0] < 100 && px[1] < 100 && px[2] < 100
}

fn horizontal_extent(points: &[(u32, u32)]) -> u32 {
    let min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let max = points.iter().map(|p| p.0).max().unwrap_or(0);
    max - min
}

#[test]
fn text_is_drawn_with_a_registered_face() {
    let mut rig = TextRig::new(None);
    let empty = rig.render(false);
    rig.add_text("Hi", TextRig::plain_style());
    let frame = rig.render(false);
    assert_ne!(frame, empty);
    let ink = pixels_where(&frame, dark);
    assert!(ink.len() > 30, "only {} dark pixels", ink.len());
    // Baseline sits at y = 40; glyphs rise above it.
    assert!(ink.iter().all(|&(_, y)| y <= 42));
}

#[test]
fn outline_paints_around_the_fill() {
    let red = |px: [u8; 4]| px[0] > 200 && px[1] < 80 && px[2] < 80;

    let mut plain = TextRig::new(None);
    plain.add_text("Hi", TextRig::plain_style());
    assert!(pixels_where(&plain.render(false), red).is_empty());

    let mut outlined = TextRig::new(None);
    let mut style = TextRig::plain_style();
    style.outline.width = 4.0;
    style.outline.color = Rgba8::rgb(255, 0, 0);
    outlined.add_text("Hi", style);
    let frame = outlined.render(false);
    assert!(!pixels_where(&frame, red).is_empty());
    // The fill is still drawn on top of the outline.
    assert!(!pixels_where(&frame, dark).is_empty());
}

#[test]
fn shadow_is_offset_from_the_text() {
    let blue = |px: [u8; 4]| px[2] > 200 && px[0] < 80 && px[1] < 80;
    let mut rig = TextRig::new(None);
    let mut style = TextRig::plain_style();
    style.shadow.blur = 0.0;
    style.shadow.offset_x = 6.0;
    style.shadow.offset_y = 6.0;
    style.shadow.color = Rgba8::rgb(0, 0, 255);
    rig.add_text("Hi", style);
    let frame = rig.render(false);

    let shadow = pixels_where(&frame, blue);
    let text = pixels_where(&frame, dark);
    assert!(!shadow.is_empty() && !text.is_empty());
    let lowest = |pts: &[(u32, u32)]| pts.iter().map(|p| p.1).max().unwrap_or(0);
    assert!(lowest(&shadow) > lowest(&text));
}

#[test]
fn letter_spacing_keeps_the_space_advance() {
    let mut plain = TextRig::new(None);
    plain.add_text("A B", TextRig::plain_style());
    let plain_extent = horizontal_extent(&pixels_where(&plain.render(false), dark));

    let mut spaced = TextRig::new(None);
    let mut style = TextRig::plain_style();
    style.letter_spacing = 10.0;
    spaced.add_text("A B", style);
    let spaced_extent = horizontal_extent(&pixels_where(&spaced.render(false), dark));

    // Two gaps of 10px each; the space itself must keep its width.
    let grown = spaced_extent as i64 - plain_extent as i64;
    assert!((grown - 20).abs() <= 2, "grew by {grown}px");
}

#[test]
fn watermark_is_drawn_bottom_right() {
    let mut bare = TextRig::new(None);
    let mut marked = TextRig::new(Some(WatermarkConfig {
        color: Rgba8::BLACK,
        ..WatermarkConfig::default()
    }));
    let ink = pixels_where(&marked.render(false), dark);
    assert!(pixels_where(&bare.render(false), dark).is_empty());
    assert!(!ink.is_empty());
    assert!(ink.iter().all(|&(x, y)| x > 100 && y > 50));
}

#[test]
fn selected_text_shows_width_readout() {
    let mut rig = TextRig::new(None);
    rig.add_text("Hi", TextRig::plain_style());
    rig.scene.select(Selection::Text(0));
    let plain = rig.render(false);
    let decorated = rig.render(true);
    assert_ne!(plain, decorated);
    // Outline, handles and the "160px" readout use the accent colour.
    let accent = |px: [u8; 4]| px[2] > 200 && px[0] < 60;
    assert!(!pixels_where(&decorated, accent).is_empty());
}
