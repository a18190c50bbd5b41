use crate::assets::cache::SourceKey;
use crate::foundation::core::{Point, Rect, Rgba8};
use serde::{Deserialize, Serialize};

/// Horizontal alignment of wrapped lines inside a text box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of the line block inside a text box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextCase {
    #[default]
    #[serde(rename = "uppercase", alias = "upper")]
    Upper,
    #[serde(rename = "lowercase", alias = "lower")]
    Lower,
    #[serde(rename = "normal", alias = "asWritten")]
    AsWritten,
}

impl TextCase {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::AsWritten => text.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub width: f32,
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub color: Rgba8,
}

impl Shadow {
    pub fn is_visible(&self) -> bool {
        !self.color.is_invisible()
            && (self.blur > 0.0 || self.offset_x != 0.0 || self.offset_y != 0.0)
    }
}

/// Per-box text styling.
///
/// `font_size` is the requested size; it is mirrored into [`TextBox::max_font_size`], which is the
/// upper bound used when fitting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f32,
    pub color: Rgba8,
    pub font_family: String,
    pub font_weight: u16,
    pub letter_spacing: f32,
    pub text_case: TextCase,
    pub outline: Outline,
    pub shadow: Shadow,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 40.0,
            color: Rgba8::WHITE,
            font_family: "Impact".to_owned(),
            font_weight: 900,
            letter_spacing: 0.0,
            text_case: TextCase::Upper,
            outline: Outline {
                width: 1.0,
                color: Rgba8::BLACK,
            },
            shadow: Shadow {
                blur: 5.0,
                offset_x: 1.0,
                offset_y: 1.0,
                color: Rgba8::BLACK,
            },
        }
    }
}

/// Stable identity of a text box within one scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextBoxId(pub u32);

/// Stable identity of an image overlay within one scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u32);

/// Where a text box came from. Template boxes are permanent for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxOrigin {
    Template,
    User,
}

/// A caption block.
///
/// `y` is the baseline of the first line, `x` the left edge. The selectable body spans
/// `[x, x + width] x [y - max_font_size, y + height]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBox {
    pub id: TextBoxId,
    pub origin: BoxOrigin,
    /// Optional caller-supplied label carried over from the template.
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub max_font_size: f32,
    pub min_font_size: f32,
    pub align: Align,
    pub vertical_align: Option<VerticalAlign>,
    pub style: TextStyle,
    pub text: String,
}

impl TextBox {
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn is_template(&self) -> bool {
        self.origin == BoxOrigin::Template
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn body_rect(&self) -> Rect {
        Rect::new(
            self.x,
            self.y - f64::from(self.max_font_size),
            self.x + self.width,
            self.y + self.height,
        )
    }

    /// Set the requested font size, keeping `min_font_size <= max_font_size`.
    pub fn set_font_size(&mut self, size: f32) {
        let size = size.max(1.0);
        self.style.font_size = size;
        self.max_font_size = size;
        if self.min_font_size > size {
            self.min_font_size = size;
        }
    }
}

/// An image placed over the base picture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageOverlay {
    pub id: OverlayId,
    pub source: SourceKey,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub original_width: u32,
    pub original_height: u32,
    pub opacity: f32,
    /// Clockwise rotation about the center, normalised into `[0, 360)`.
    pub rotation_deg: f64,
}

impl ImageOverlay {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A freehand ink stroke. Later strokes paint over (or erase through) earlier ones.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: Rgba8,
    pub size: f64,
    pub is_eraser: bool,
}

/// Mutually exclusive selection, stored as an index into the owning collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Text(usize),
    Overlay(usize),
}

impl Selection {
    pub fn text(self) -> Option<usize> {
        match self {
            Self::Text(i) => Some(i),
            _ => None,
        }
    }

    pub fn overlay(self) -> Option<usize> {
        match self {
            Self::Overlay(i) => Some(i),
            _ => None,
        }
    }
}

/// Which edge of a text box a width resize drags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One of the eight overlay resize handles, named by compass direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl OverlayHandle {
    pub const ALL: [Self; 8] = [
        Self::Nw,
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
    ];

    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Nw | Self::Ne)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Sw | Self::Se)
    }

    /// Handle position in unit coordinates of the overlay rect (`0..=1` on each axis).
    pub fn unit_anchor(self) -> (f64, f64) {
        match self {
            Self::Nw => (0.0, 0.0),
            Self::N => (0.5, 0.0),
            Self::Ne => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::Se => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::Sw => (0.0, 1.0),
            Self::W => (0.0, 0.5),
        }
    }
}

/// Text box geometry as delivered by the template catalogue, in base-image pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTextBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f32,
    #[serde(default)]
    pub min_font: Option<f32>,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub vertical_align: Option<VerticalAlign>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Base image locator plus its initial text boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub image: String,
    pub text_boxes: Vec<TemplateTextBox>,
}

impl Template {
    pub fn from_json_str(s: &str) -> crate::CaptionResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| crate::CaptionError::config(format!("invalid template json: {e}")))
    }

    /// Default top/bottom caption layout for a user-uploaded picture.
    pub fn for_image(image: impl Into<String>, width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        let box_width = (w * 0.9).min(w - 40.0).max(1.0);
        let box_height = (h * 0.2).min(150.0).max(1.0);
        let font_size = (w.min(h) * 0.08).max(30.0) as f32;
        let x = (w * 0.05).max(20.0);
        let top = TemplateTextBox {
            x,
            y: (h * 0.1).max(50.0),
            width: box_width,
            height: box_height,
            font_size,
            min_font: Some(20.0),
            align: Align::Center,
            vertical_align: None,
            id: None,
        };
        let bottom = TemplateTextBox {
            y: (h * 0.7).max(h - 200.0),
            ..top.clone()
        };
        Self {
            image: image.into(),
            text_boxes: vec![top, bottom],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
