pub mod bodies;
pub mod orbit;
pub mod orrery;
pub mod scale;
