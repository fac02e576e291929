use crate::api::types::GameEvent;
use crate::camera::rig::CameraPose;
use crate::core::scene::SceneGraph;
use crate::input::queue::InputQueue;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f64,
    /// Maximum number of body instances written per frame (default: 64).
    pub max_instances: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_instances: 64,
            max_events: 32,
        }
    }
}

/// The contract every simulation front-end fulfils.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Build the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// Replace the simulation configuration with host-provided JSON.
    /// Returns false (and keeps the current scene) when the JSON is rejected.
    fn configure(&mut self, _ctx: &mut EngineContext, _json: &str) -> bool {
        false
    }

    /// One fixed step: apply input, advance the simulation, publish state.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: SceneGraph,
    /// Camera placement for the renderer; `None` leaves the camera alone.
    pub camera: Option<CameraPose>,
    pub events: Vec<GameEvent>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            scene: SceneGraph::new(),
            camera: None,
            events: Vec::new(),
        }
    }

    /// Emit a game event to be forwarded to the host page.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_cleared_per_frame() {
        let mut ctx = EngineContext::new();
        ctx.emit_event(GameEvent { kind: 1.0, a: 2.0, b: 3.0, c: 4.0 });
        assert_eq!(ctx.events.len(), 1);
        ctx.clear_frame_data();
        assert!(ctx.events.is_empty());
    }
}
