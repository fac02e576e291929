use astrini_engine::{
    EngineContext, FixedTimestep, Game, GameConfig, InputEvent, InputQueue, InstanceBuffer,
    ProtocolLayout,
};

/// Generic runner that wires a [`Game`] to the browser frame loop.
///
/// Each front-end creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]` (see [`export_game!`](crate::export_game)),
/// because wasm-bindgen cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    buffer: InstanceBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    initialized: bool,
    frame: u64,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);
        let buffer = InstanceBuffer::with_capacity(config.max_instances);

        Self {
            game,
            ctx: EngineContext::new(),
            input: InputQueue::new(),
            buffer,
            timestep,
            layout,
            config,
            initialized: false,
            frame: 0,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.layout = ProtocolLayout::from_config(&self.config);
        self.game.init(&mut self.ctx);
        self.buffer.build(&self.ctx.scene, self.ctx.camera);
        self.initialized = true;
    }

    /// Hand host-provided configuration JSON to the game.
    pub fn load_config(&mut self, json: &str) -> bool {
        let accepted = self.game.configure(&mut self.ctx, json);
        if accepted {
            self.buffer.build(&self.ctx.scene, self.ctx.camera);
        } else {
            log::warn!("runner: configuration rejected");
        }
        accepted
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one browser frame: fixed-step updates, then refresh the buffers.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt as f64);
        for _ in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            // Input applies once, on the first step of the frame.
            self.input.drain();
        }

        self.buffer.build(&self.ctx.scene, self.ctx.camera);
        self.frame += 1;
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.buffer.instance_count()
    }

    pub fn camera_ptr(&self) -> *const f32 {
        self.buffer.camera_ptr()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len().min(self.layout.max_events) as u32
    }

    // ---- Capacity accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrini_engine::{GameEvent, LocalTransform};

    struct Counter {
        updates: u32,
        keys_seen: u32,
    }

    impl Game for Counter {
        fn init(&mut self, ctx: &mut EngineContext) {
            let id = ctx.scene.add(None, LocalTransform::new());
            ctx.scene.set_renderable(id, true);
            ctx.scene.propagate();
        }

        fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
            self.updates += 1;
            self.keys_seen += input.len() as u32;
            ctx.emit_event(GameEvent { kind: 1.0, a: self.updates as f32, b: 0.0, c: 0.0 });
        }
    }

    #[test]
    fn tick_before_init_does_nothing() {
        let mut runner = GameRunner::new(Counter { updates: 0, keys_seen: 0 });
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.frame_counter(), 0);
    }

    #[test]
    fn input_is_seen_once_per_frame() {
        let mut runner = GameRunner::new(Counter { updates: 0, keys_seen: 0 });
        runner.init();
        runner.push_input(InputEvent::KeyDown { key_code: 78, shift: false, ctrl: false });
        // Three fixed steps in one frame.
        runner.tick(3.0 / 60.0 + 0.001);
        assert_eq!(runner.game.updates, 3);
        assert_eq!(runner.game.keys_seen, 1);
        assert_eq!(runner.instance_count(), 1);
        assert_eq!(runner.game_events_len(), 3);
    }

    #[test]
    fn default_configure_rejects() {
        let mut runner = GameRunner::new(Counter { updates: 0, keys_seen: 0 });
        runner.init();
        assert!(!runner.load_config("{}"));
    }
}
