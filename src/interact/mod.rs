//! Pointer handling: display-to-surface mapping, hit testing and the interaction state machine.

/// Handle geometry and priority-ordered hit testing.
pub mod hit;
/// Raw pointer events and coordinate mapping.
pub mod input;
/// The drag/resize/rotate/draw state machine.
pub mod machine;
