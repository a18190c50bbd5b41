use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::CaptionResult;
use crate::ink::InkTool;
use crate::interact::hit::{angle_deg, hit_test, HandleMetrics, HitTarget};
use crate::scene::model::{OverlayHandle, OverlayId, Selection, Side, TextBoxId};
use crate::scene::scene::Scene;

/// Whether pointer input selects and manipulates entities or draws ink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Select,
    Draw,
}

/// The active pointer gesture. Exactly one is in progress at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingText {
        id: TextBoxId,
        grab: Vec2,
    },
    ResizingTextWidth {
        id: TextBoxId,
        side: Side,
    },
    DraggingOverlay {
        id: OverlayId,
        grab: Vec2,
    },
    ResizingOverlay {
        id: OverlayId,
        handle: OverlayHandle,
        start: Point,
        rect: Rect,
        rotation_deg: f64,
    },
    RotatingOverlay {
        id: OverlayId,
        center: Point,
        start_angle: f64,
        start_rotation: f64,
    },
    Drawing,
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingText { .. } => "dragging_text",
            Self::ResizingTextWidth { .. } => "resizing_text_width",
            Self::DraggingOverlay { .. } => "dragging_overlay",
            Self::ResizingOverlay { .. } => "resizing_overlay",
            Self::RotatingOverlay { .. } => "rotating_overlay",
            Self::Drawing => "drawing",
        }
    }
}

/// Pointer cursor the host should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Grab,
    Grabbing,
    Resize(OverlayHandle),
    Rotate,
    Crosshair,
}

/// What a pointer event changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub scene_changed: bool,
    /// The gesture ended; the next draw must not be throttled.
    pub gesture_ended: bool,
}

impl Outcome {
    const NONE: Self = Self {
        scene_changed: false,
        gesture_ended: false,
    };
    const CHANGED: Self = Self {
        scene_changed: true,
        gesture_ended: false,
    };
}

/// Finite-state machine turning surface-space pointer samples into scene mutations.
#[derive(Clone, Debug, Default)]
pub struct InteractionMachine {
    state: InteractionState,
    mode: Mode,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode. Any gesture in progress is dropped; an unfinished stroke is discarded.
    pub fn set_mode(&mut self, mode: Mode, ink: &mut InkTool) {
        if self.mode != mode {
            ink.cancel();
            self.transition(InteractionState::Idle);
            self.mode = mode;
        }
    }

    fn transition(&mut self, next: InteractionState) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&next) {
            tracing::debug!(from = self.state.name(), to = next.name(), "interaction");
        }
        self.state = next;
    }

    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        ink: &mut InkTool,
        p: Point,
        metrics: &HandleMetrics,
    ) -> Outcome {
        if self.mode == Mode::Draw {
            ink.begin(p);
            self.transition(InteractionState::Drawing);
            return Outcome::CHANGED;
        }

        let before = scene.selection();
        let next = match hit_test(scene, p, metrics) {
            HitTarget::None => {
                scene.clear_selection();
                InteractionState::Idle
            }
            HitTarget::OverlayRotate { index } => {
                let o = &scene.overlays()[index];
                let center = o.center();
                InteractionState::RotatingOverlay {
                    id: o.id,
                    center,
                    start_angle: angle_deg(center, p),
                    start_rotation: o.rotation_deg,
                }
            }
            HitTarget::OverlayHandle { index, handle } => {
                let o = &scene.overlays()[index];
                InteractionState::ResizingOverlay {
                    id: o.id,
                    handle,
                    start: p,
                    rect: o.rect(),
                    rotation_deg: o.rotation_deg,
                }
            }
            HitTarget::Overlay { index } => {
                scene.select(Selection::Overlay(index));
                let o = &scene.overlays()[index];
                InteractionState::DraggingOverlay {
                    id: o.id,
                    grab: p - Point::new(o.x, o.y),
                }
            }
            HitTarget::TextWidthHandle { index, side } => InteractionState::ResizingTextWidth {
                id: scene.text_boxes()[index].id,
                side,
            },
            HitTarget::Text { index } => {
                scene.select(Selection::Text(index));
                let tb = &scene.text_boxes()[index];
                InteractionState::DraggingText {
                    id: tb.id,
                    grab: p - Point::new(tb.x, tb.y),
                }
            }
        };
        self.transition(next);
        Outcome {
            scene_changed: scene.selection() != before,
            gesture_ended: false,
        }
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, ink: &mut InkTool, p: Point) -> Outcome {
        let applied = match self.state {
            InteractionState::Idle => return Outcome::NONE,
            InteractionState::Drawing => {
                return if ink.extend(p) {
                    Outcome::CHANGED
                } else {
                    Outcome::NONE
                };
            }
            InteractionState::DraggingText { id, grab } => {
                let target = p - grab;
                scene.move_text_box(id, target.x, target.y)
            }
            InteractionState::ResizingTextWidth { id, side } => {
                resize_text_width(scene, id, side, p.x)
            }
            InteractionState::DraggingOverlay { id, grab } => {
                let target = p - grab;
                scene.move_overlay(id, target.x, target.y)
            }
            InteractionState::ResizingOverlay {
                id,
                handle,
                start,
                rect,
                rotation_deg,
            } => {
                // Screen-space drag expressed along the overlay's own axes.
                let local = Affine::rotate(-rotation_deg.to_radians()) * (p - start).to_point();
                scene.resize_overlay_from(id, rect, handle, local.x, local.y)
            }
            InteractionState::RotatingOverlay {
                id,
                center,
                start_angle,
                start_rotation,
            } => scene.rotate_overlay(id, start_rotation + angle_deg(center, p) - start_angle),
        };
        self.settle(applied)
    }

    /// Finish the current gesture. Drags have already been committed live.
    pub fn pointer_up(&mut self, scene: &mut Scene, ink: &mut InkTool) -> Outcome {
        let was = std::mem::take(&mut self.state);
        let scene_changed = match was {
            InteractionState::Idle => return Outcome::NONE,
            InteractionState::Drawing => match ink.finish() {
                Some(stroke) => {
                    tracing::debug!(points = stroke.points.len(), "stroke committed");
                    scene.push_stroke(stroke);
                    true
                }
                None => false,
            },
            _ => true,
        };
        tracing::debug!(from = was.name(), to = "idle", "interaction");
        Outcome {
            scene_changed,
            gesture_ended: true,
        }
    }

    /// Drop the gesture if its entity disappeared underneath it.
    fn settle(&mut self, applied: CaptionResult<()>) -> Outcome {
        match applied {
            Ok(()) => Outcome::CHANGED,
            Err(e) => {
                tracing::debug!("gesture target vanished: {e}");
                self.transition(InteractionState::Idle);
                Outcome::NONE
            }
        }
    }

    /// Cursor for a hover (or an active gesture) at `p`.
    pub fn cursor_hint(&self, scene: &Scene, p: Point, metrics: &HandleMetrics) -> CursorHint {
        match self.state {
            InteractionState::DraggingText { .. } | InteractionState::DraggingOverlay { .. } => {
                return CursorHint::Grabbing;
            }
            InteractionState::ResizingOverlay { handle, .. } => return CursorHint::Resize(handle),
            InteractionState::ResizingTextWidth { side, .. } => {
                return CursorHint::Resize(side_handle(side));
            }
            InteractionState::RotatingOverlay { .. } => return CursorHint::Rotate,
            InteractionState::Drawing => return CursorHint::Crosshair,
            InteractionState::Idle => {}
        }
        if self.mode == Mode::Draw {
            return CursorHint::Crosshair;
        }
        match hit_test(scene, p, metrics) {
            HitTarget::None => CursorHint::Default,
            HitTarget::OverlayHandle { handle, .. } => CursorHint::Resize(handle),
            HitTarget::OverlayRotate { .. } => CursorHint::Rotate,
            HitTarget::TextWidthHandle { side, .. } => CursorHint::Resize(side_handle(side)),
            HitTarget::Overlay { .. } | HitTarget::Text { .. } => CursorHint::Grab,
        }
    }
}

fn side_handle(side: Side) -> OverlayHandle {
    match side {
        Side::Left => OverlayHandle::W,
        Side::Right => OverlayHandle::E,
    }
}

/// The dragged edge follows the pointer; the opposite edge stays put.
fn resize_text_width(scene: &mut Scene, id: TextBoxId, side: Side, px: f64) -> CaptionResult<()> {
    let (x, right) = match scene.text_box(id) {
        Some(tb) => (tb.x, tb.right()),
        None => (0.0, 0.0),
    };
    let width = match side {
        Side::Left => right - px,
        Side::Right => px - x,
    };
    scene.resize_text_box_width(id, width, side)
}

#[cfg(test)]
#[path = "../../tests/unit/interact/machine.rs"]
mod tests;
