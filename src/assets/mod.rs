//! Image and font resources shared by every entity in a session.

/// Decoded-bitmap cache keyed by source identity.
pub mod cache;
/// Raster and SVG decoding with payload sniffing.
pub mod decode;
/// Font face registry and readiness tracking.
pub mod fonts;
/// Two-phase load tickets with last-writer-wins acceptance.
pub mod loads;
pub(crate) mod svg_raster;
