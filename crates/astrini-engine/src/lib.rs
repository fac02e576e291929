pub mod api;
pub mod core;
pub mod sim;
pub mod camera;
pub mod bridge;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{BodyId, NodeId, Target, GameEvent};
pub use core::config::{
    SimConfig, ConfigError, Scaled, BodyConfig, OrbitConfig, InclinationMode,
    ClockConfig, TransitionConfig, ScaleConfig, CameraConfig,
};
pub use core::scene::{SceneGraph, LocalTransform, WorldTransform, Orientation};
pub use core::time::{SimulationClock, DilationId, FixedTimestep, julian_day};
pub use sim::orbit::{OrbitalModel, Body, Orbit, Angles, spin_angle, orbit_angle};
pub use sim::scale::ScaleController;
pub use sim::orrery::{Orrery, Decorations, DateReadout};
pub use camera::rig::{CameraRig, CameraPose, AttachmentState, Locator};
pub use camera::transition::{TransitionSequencer, AnchorKind, Phase};
pub use input::queue::{InputEvent, InputQueue};
pub use input::command::Command;
pub use bridge::protocol::ProtocolLayout;
pub use bridge::instance::{BodyInstance, CameraInstance, InstanceBuffer};

// Extensions — timing helpers
pub use extensions::{Easing, lerp, lerp_dvec3, ease, Tween};
