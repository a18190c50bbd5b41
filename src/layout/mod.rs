//! Text measurement and the auto-fitting line layout.

/// Font-size search and line placement.
pub mod fit;
/// Width measurement backends.
pub mod measure;
/// Parley-backed line shaping.
pub mod shaper;
