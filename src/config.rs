use crate::foundation::core::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::scene::model::TextStyle;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Small fixed-position string drawn above the base image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub text: String,
    pub font_size: f32,
    pub color: Rgba8,
    /// Distance from the bottom-right corner, in surface pixels.
    pub margin: f64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "captionkit".to_owned(),
            font_size: 14.0,
            color: Rgba8::rgba(255, 255, 255, 160),
            margin: 8.0,
        }
    }
}

/// Defaults for the freehand ink tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkConfig {
    pub color: Rgba8,
    pub size: f64,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for InkConfig {
    fn default() -> Self {
        Self {
            color: Rgba8::rgb(255, 0, 0),
            size: 5.0,
            min_size: 1.0,
            max_size: 100.0,
        }
    }
}

/// Every tunable constant of the editor.
///
/// All fields have defaults, so a JSON document only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size decrement per fitting iteration.
    pub font_step: f32,
    /// Line advance as a multiple of the font size.
    pub line_height: f32,
    /// Used when a template box omits `minFont`.
    pub default_min_font_size: f32,
    pub min_overlay_size: f64,
    pub min_text_width: f64,
    /// How far a text box may be dragged past the surface edges.
    pub text_drag_overscroll: f64,
    /// Handle edge length as a fraction of the shorter surface side.
    pub handle_size_ratio: f64,
    pub handle_min_size: f64,
    pub touch_handle_multiplier: f64,
    /// Distance of the rotation handle above the overlay's top edge.
    pub rotation_handle_offset: f64,
    pub redraw_throttle_ms: u64,
    pub font_settle_timeout_ms: u64,
    /// Initial overlay size as a fraction of the shorter surface side.
    pub overlay_initial_fraction: f64,
    pub export_file_name: String,
    pub font_fallbacks: Vec<String>,
    pub default_style: TextStyle,
    pub watermark: Option<WatermarkConfig>,
    pub ink: InkConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_step: 2.0,
            line_height: 1.2,
            default_min_font_size: 20.0,
            min_overlay_size: 20.0,
            min_text_width: 50.0,
            text_drag_overscroll: 10.0,
            handle_size_ratio: 0.02,
            handle_min_size: 10.0,
            touch_handle_multiplier: 2.0,
            rotation_handle_offset: 30.0,
            redraw_throttle_ms: 16,
            font_settle_timeout_ms: 2000,
            overlay_initial_fraction: 0.4,
            export_file_name: "meme.png".to_owned(),
            font_fallbacks: vec![
                "Impact".to_owned(),
                "Arial".to_owned(),
                "sans-serif".to_owned(),
            ],
            default_style: TextStyle::default(),
            watermark: Some(WatermarkConfig::default()),
            ink: InkConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> CaptionResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| CaptionError::config(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CaptionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CaptionError::config(format!("open editor config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            CaptionError::config(format!("parse editor config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CaptionResult<()> {
        fn positive(name: &str, v: f64) -> CaptionResult<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CaptionError::config(format!("{name} must be finite and > 0")))
            }
        }

        positive("font_step", f64::from(self.font_step))?;
        positive("line_height", f64::from(self.line_height))?;
        positive("default_min_font_size", f64::from(self.default_min_font_size))?;
        positive("min_overlay_size", self.min_overlay_size)?;
        positive("min_text_width", self.min_text_width)?;
        positive("handle_size_ratio", self.handle_size_ratio)?;
        positive("handle_min_size", self.handle_min_size)?;
        positive("touch_handle_multiplier", self.touch_handle_multiplier)?;
        positive("rotation_handle_offset", self.rotation_handle_offset)?;
        positive("default_style.font_size", f64::from(self.default_style.font_size))?;
        positive("ink.min_size", self.ink.min_size)?;

        if !(self.text_drag_overscroll.is_finite() && self.text_drag_overscroll >= 0.0) {
            return Err(CaptionError::config(
                "text_drag_overscroll must be finite and >= 0",
            ));
        }
        if !(self.overlay_initial_fraction > 0.0 && self.overlay_initial_fraction <= 1.0) {
            return Err(CaptionError::config(
                "overlay_initial_fraction must be in (0, 1]",
            ));
        }
        if self.ink.max_size < self.ink.min_size {
            return Err(CaptionError::config("ink.max_size must be >= ink.min_size"));
        }
        if !self.export_file_name.to_ascii_lowercase().ends_with(".png") {
            return Err(CaptionError::config("export_file_name must end with .png"));
        }
        if self.default_style.font_family.trim().is_empty() {
            return Err(CaptionError::config("default_style.font_family must be non-empty"));
        }
        Ok(())
    }

    pub fn redraw_throttle(&self) -> Duration {
        Duration::from_millis(self.redraw_throttle_ms)
    }

    pub fn font_settle_timeout(&self) -> Duration {
        Duration::from_millis(self.font_settle_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
