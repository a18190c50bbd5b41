use crate::config::InkConfig;
use crate::foundation::core::{Point, Rgba8};
use crate::scene::model::Stroke;

/// Freehand pen/eraser settings and the stroke currently being drawn.
#[derive(Clone, Debug)]
pub struct InkTool {
    color: Rgba8,
    size: f64,
    eraser: bool,
    min_size: f64,
    max_size: f64,
    active: Option<Stroke>,
}

impl InkTool {
    pub fn from_config(cfg: &InkConfig) -> Self {
        let min_size = cfg.min_size.max(0.1);
        let max_size = cfg.max_size.max(min_size);
        Self {
            color: cfg.color,
            size: cfg.size.clamp(min_size, max_size),
            eraser: false,
            min_size,
            max_size,
            active: None,
        }
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn is_eraser(&self) -> bool {
        self.eraser
    }

    /// Settings apply to the next stroke; a stroke in progress keeps its own.
    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: f64) {
        if size.is_finite() {
            self.size = size.clamp(self.min_size, self.max_size);
        }
    }

    pub fn set_eraser(&mut self, eraser: bool) {
        self.eraser = eraser;
    }

    /// Start a stroke with a single point, replacing any unfinished one.
    pub fn begin(&mut self, p: Point) {
        self.active = Some(Stroke {
            points: vec![p],
            color: self.color,
            size: self.size,
            is_eraser: self.eraser,
        });
    }

    /// Append a point. Repeats of the last point are skipped; returns whether the stroke grew.
    pub fn extend(&mut self, p: Point) -> bool {
        match &mut self.active {
            Some(stroke) if stroke.points.last() != Some(&p) => {
                stroke.points.push(p);
                true
            }
            _ => false,
        }
    }

    /// Take the finished stroke for committing to the scene.
    pub fn finish(&mut self) -> Option<Stroke> {
        self.active.take()
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// The stroke being drawn, rendered after the committed ones.
    pub fn in_progress(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }
}

impl Default for InkTool {
    fn default() -> Self {
        Self::from_config(&InkConfig::default())
    }
}

#[cfg(test)]
#[path = "../tests/unit/ink/ink.rs"]
mod tests;
