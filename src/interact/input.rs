use crate::foundation::core::{Point, Rect, SurfaceSize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

impl PointerPhase {
    /// Up, cancel and leave all end an interaction.
    pub fn is_end(self) -> bool {
        matches!(self, Self::Up | Self::Cancel | Self::Leave)
    }
}

/// A pointer sample in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub phase: PointerPhase,
    pub position: Point,
    /// Number of simultaneous contacts; always 1 for a mouse.
    pub contacts: u8,
    /// Host monotonic clock.
    pub time: Duration,
}

impl PointerEvent {
    pub fn mouse(phase: PointerPhase, x: f64, y: f64, time: Duration) -> Self {
        Self {
            kind: PointerKind::Mouse,
            phase,
            position: Point::new(x, y),
            contacts: 1,
            time,
        }
    }

    pub fn touch(phase: PointerPhase, x: f64, y: f64, time: Duration) -> Self {
        Self {
            kind: PointerKind::Touch,
            ..Self::mouse(phase, x, y, time)
        }
    }

    pub fn with_contacts(mut self, contacts: u8) -> Self {
        self.contacts = contacts;
        self
    }

    /// Multi-touch gestures start or continue nothing; ends are always honoured.
    pub fn is_ignored(&self) -> bool {
        self.kind == PointerKind::Touch && self.contacts != 1 && !self.phase.is_end()
    }
}

/// Where the surface is shown on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    /// The surface's on-screen rectangle in display coordinates.
    pub display: Rect,
    pub surface: SurfaceSize,
}

impl DisplayMapping {
    /// Surface shown at 1:1 at the display origin.
    pub fn identity(surface: SurfaceSize) -> Self {
        Self {
            display: surface.rect(),
            surface,
        }
    }

    /// `(client - origin) * surface / displayed size`.
    pub fn to_surface(&self, p: Point) -> Point {
        let dw = self.display.width();
        let dh = self.display.height();
        let sx = if dw > 0.0 { self.surface.width_f() / dw } else { 1.0 };
        let sy = if dh > 0.0 { self.surface.height_f() / dh } else { 1.0 };
        Point::new(
            (p.x - self.display.x0) * sx,
            (p.y - self.display.y0) * sy,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/input.rs"]
mod tests;
