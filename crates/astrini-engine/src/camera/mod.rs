pub mod rig;
pub mod transition;
