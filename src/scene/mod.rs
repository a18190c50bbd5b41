//! Authoritative editing state: text boxes, image overlays, ink strokes and selection.

/// Entity and template types.
pub mod model;
/// The [`Scene`](scene::Scene) aggregate and its clamping mutators.
pub mod scene;
