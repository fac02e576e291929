// extensions/mod.rs
//
// Timing helpers shared by the clock, the scale blend and the camera
// transitions. No dependencies on the scene or the bodies.

pub mod easing;
pub mod tween;

pub use easing::{Easing, lerp, lerp_dvec3, ease};
pub use tween::Tween;
