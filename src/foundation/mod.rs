/// Geometry re-exports, surface size and colours.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
