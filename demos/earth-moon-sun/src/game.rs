/// Astrini: the Earth, the Moon and the Sun, with time controls and a
/// camera that hunts bodies down.
///
/// Keyboard (DOM key codes) and UI buttons both become engine commands.
/// State for the UI (date, speed, camera targets, toggles) goes out as game
/// events twice a second; body transforms and the camera go out every frame
/// through the instance buffer.

use astrini_engine::*;
use astrini_engine::sim::bodies::{EARTH, MOON, SUN};
use chrono::{NaiveDateTime, Utc};

// ── Key codes ────────────────────────────────────────────────────────

const KEY_A: u32 = 65;
const KEY_B: u32 = 66;
const KEY_E: u32 = 69;
const KEY_F: u32 = 70;
const KEY_H: u32 = 72;
const KEY_I: u32 = 73;
const KEY_K: u32 = 75;
const KEY_L: u32 = 76;
const KEY_M: u32 = 77;
const KEY_N: u32 = 78;
const KEY_R: u32 = 82;
const KEY_W: u32 = 87;

// ── Game event kinds to the UI ───────────────────────────────────────

const EVENT_DATE: f32 = 1.0;
const EVENT_TIME: f32 = 2.0;
const EVENT_SPEED: f32 = 3.0;
const EVENT_CAMERA: f32 = 4.0;
const EVENT_SCENE: f32 = 5.0;
const EVENT_DECORATIONS: f32 = 6.0;
const EVENT_SHADOW: f32 = 7.0;

/// Real seconds between UI refreshes.
const UI_INTERVAL: f64 = 0.5;

pub struct Astrini {
    config: SimConfig,
    start: NaiveDateTime,
    orrery: Option<Orrery>,
    fixed_dt: f64,
    ui_timer: f64,
}

impl Astrini {
    pub fn new() -> Self {
        Self::with_start(SimConfig::default(), Utc::now().naive_utc())
    }

    pub fn with_start(config: SimConfig, start: NaiveDateTime) -> Self {
        Self {
            config,
            start,
            orrery: None,
            fixed_dt: GameConfig::default().fixed_dt,
            ui_timer: 0.0,
        }
    }

    pub fn orrery(&self) -> Option<&Orrery> {
        self.orrery.as_ref()
    }

    /// Map a key press to a command.
    fn command_for_key(&self, key_code: u32, shift: bool, ctrl: bool) -> Option<Command> {
        let body = |name: &str| {
            self.orrery
                .as_ref()
                .and_then(|o| o.body_id(name))
                .map(Target::Body)
        };
        let command = match key_code {
            KEY_I => Command::Reverse,
            KEY_K => Command::ChangeSpeed(0.5),
            KEY_L => Command::ChangeSpeed(2.0),
            KEY_M => Command::ChangeSpeed(1000.0),
            KEY_N => Command::TogglePause,
            KEY_A => Command::Follow(None),
            KEY_W => Command::Look(None),
            KEY_B => Command::ToggleScale,
            KEY_H => Command::Follow(Some(Target::Home)),
            KEY_E if shift => Command::ToggleEarthTilt,
            KEY_R if shift => Command::ToggleMoonInclination { hard: ctrl },
            KEY_E | KEY_R | KEY_F => {
                let name = match key_code {
                    KEY_E => EARTH,
                    KEY_R => MOON,
                    _ => SUN,
                };
                let target = body(name)?;
                if ctrl {
                    Command::Look(Some(target))
                } else {
                    Command::Follow(Some(target))
                }
            }
            _ => return None,
        };
        Some(command)
    }

    fn publish(&self, orrery: &Orrery, ctx: &mut EngineContext) {
        let date = orrery.date();
        ctx.emit_event(GameEvent {
            kind: EVENT_DATE,
            a: date.year as f32,
            b: date.month as f32,
            c: date.day as f32,
        });
        ctx.emit_event(GameEvent {
            kind: EVENT_TIME,
            a: date.hour as f32,
            b: date.minute as f32,
            c: date.second as f32,
        });
        ctx.emit_event(GameEvent {
            kind: EVENT_SPEED,
            a: orrery.speed() as f32,
            b: flag(orrery.is_paused()),
            c: flag(orrery.is_reversed()),
        });
        ctx.emit_event(GameEvent {
            kind: EVENT_CAMERA,
            a: Target::to_code(orrery.following()),
            b: Target::to_code(orrery.looking()),
            c: flag(orrery.is_travelling()),
        });
        let inclination = match orrery.moon_inclination() {
            InclinationMode::Flat => 0.0,
            InclinationMode::Real => 1.0,
            InclinationMode::Exaggerated => 2.0,
        };
        ctx.emit_event(GameEvent {
            kind: EVENT_SCENE,
            a: orrery.blend() as f32,
            b: flag(orrery.earth_tilted()),
            c: inclination,
        });
        let d = orrery.decorations();
        let bits = [d.shadows, d.markers, d.orbits, d.stars]
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, on)| if *on { acc | 1 << i } else { acc });
        ctx.emit_event(GameEvent { kind: EVENT_DECORATIONS, a: bits as f32, b: 0.0, c: 0.0 });
        for id in orrery.model().ids() {
            ctx.emit_event(GameEvent {
                kind: EVENT_SHADOW,
                a: id.0 as f32,
                b: flag(orrery.shadow_visible(id)),
                c: 0.0,
            });
        }
    }
}

impl Default for Astrini {
    fn default() -> Self {
        Self::new()
    }
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

impl Game for Astrini {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: self.fixed_dt,
            max_instances: 16,
            max_events: 32,
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        match Orrery::new(&self.config, self.start, &mut ctx.scene) {
            Ok(orrery) => {
                ctx.camera = Some(orrery.pose());
                self.orrery = Some(orrery);
            }
            Err(e) => log::error!("astrini: cannot build the scene: {}", e),
        }
    }

    fn configure(&mut self, ctx: &mut EngineContext, json: &str) -> bool {
        let config = match SimConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("astrini: {}", e);
                return false;
            }
        };
        let start = self.orrery.as_ref().map_or(self.start, |o| o.now());
        let mut scene = SceneGraph::new();
        match Orrery::new(&config, start, &mut scene) {
            Ok(orrery) => {
                ctx.scene = scene;
                ctx.camera = Some(orrery.pose());
                self.orrery = Some(orrery);
                self.config = config;
                self.ui_timer = UI_INTERVAL;
                log::info!("astrini: configuration loaded");
                true
            }
            Err(e) => {
                log::warn!("astrini: {}", e);
                false
            }
        }
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        let commands: Vec<Command> = input
            .iter()
            .filter_map(|event| match *event {
                InputEvent::KeyDown { key_code, shift, ctrl } => {
                    self.command_for_key(key_code, shift, ctrl)
                }
                InputEvent::Custom { kind, a, b, c } => Command::from_custom(kind, a, b, c),
                InputEvent::KeyUp { .. } => None,
            })
            .collect();

        let Some(mut orrery) = self.orrery.take() else { return };
        for command in commands {
            orrery.apply(command, &mut ctx.scene);
        }
        orrery.frame(self.fixed_dt, &mut ctx.scene);
        ctx.camera = Some(orrery.pose());

        self.ui_timer += self.fixed_dt;
        if self.ui_timer >= UI_INTERVAL {
            self.ui_timer -= UI_INTERVAL;
            self.publish(&orrery, ctx);
        }
        self.orrery = Some(orrery);
    }
}
