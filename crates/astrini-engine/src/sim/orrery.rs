// sim/orrery.rs
//
// The frame driver. Owns the clock, the bodies, the scale blend and the
// camera rig, and runs them in the one order that keeps the camera from
// lagging a frame behind the bodies:
//
//   clock.advance → scale.tick → model.place → graph.propagate → rig.tick
//
// The scene graph belongs to the host and is passed in.

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike, Utc};
use glam::DVec3;

use crate::api::types::{BodyId, Target};
use crate::camera::rig::{CameraPose, CameraRig, Locator};
use crate::core::config::{ConfigError, InclinationMode, SimConfig};
use crate::core::scene::SceneGraph;
use crate::core::time::SimulationClock;
use crate::input::command::Command;
use crate::sim::bodies::{EARTH, MOON};
use crate::sim::orbit::OrbitalModel;
use crate::sim::scale::ScaleController;

/// Visibility switches for the scene decorations the renderer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorations {
    /// Cast-shadow cylinders behind each body.
    pub shadows: bool,
    /// Screen-space markers and spin-axis lines.
    pub markers: bool,
    pub orbits: bool,
    pub stars: bool,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            shadows: false,
            markers: false,
            orbits: true,
            stars: true,
        }
    }
}

/// Calendar fields of the simulated instant, for the date readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateReadout {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl From<NaiveDateTime> for DateReadout {
    fn from(t: NaiveDateTime) -> Self {
        Self {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
        }
    }
}

pub struct Orrery {
    clock: SimulationClock,
    model: OrbitalModel,
    scale: ScaleController,
    rig: CameraRig,
    home: DVec3,
    decorations: Decorations,
}

impl Orrery {
    /// Validate `config`, build the bodies into `graph` and place them at `start`.
    pub fn new(
        config: &SimConfig,
        start: NaiveDateTime,
        graph: &mut SceneGraph,
    ) -> Result<Self, ConfigError> {
        let model = OrbitalModel::build(config, graph)?;
        let home = config.home_position();
        let rig = CameraRig::new(&config.camera, &config.transitions, &model, home)?;
        let mut orrery = Self {
            clock: SimulationClock::new(&config.clock, start),
            model,
            scale: ScaleController::new(&config.scale),
            rig,
            home,
            decorations: Decorations::default(),
        };
        orrery.settle(graph);
        log::info!(
            "orrery: {} bodies at {} (jd {:.5})",
            orrery.model.len(),
            orrery.clock.now(),
            orrery.clock.julian_day()
        );
        Ok(orrery)
    }

    /// Place the bodies for the current instant and refresh the camera pose
    /// without advancing anything.
    fn settle(&mut self, graph: &mut SceneGraph) {
        self.model.place(self.clock.julian_day(), graph);
        graph.propagate();
        let locator = Locator::new(&self.model, graph, self.home);
        self.rig.update_pose(&locator);
    }

    /// Run one frame of `dt` real seconds.
    pub fn frame(&mut self, dt: f64, graph: &mut SceneGraph) {
        self.clock.advance(dt);
        self.scale.tick(dt, &mut self.model);
        self.model.place(self.clock.julian_day(), graph);
        graph.propagate();
        let locator = Locator::new(&self.model, graph, self.home);
        self.rig.tick(dt, &mut self.clock, &locator);
    }

    /// Apply a user command, reading the wall clock for [`Command::SetTimeNow`].
    pub fn apply(&mut self, command: Command, graph: &mut SceneGraph) -> bool {
        self.apply_at(command, graph, Utc::now().naive_utc())
    }

    /// Apply a user command with an explicit "now". Returns whether the
    /// command changed anything.
    pub fn apply_at(
        &mut self,
        command: Command,
        graph: &mut SceneGraph,
        now: NaiveDateTime,
    ) -> bool {
        log::debug!("orrery: {:?}", command);
        match command {
            Command::Follow(target) => {
                let locator = Locator::new(&self.model, graph, self.home);
                self.rig.follow(target, &mut self.clock, &locator)
            }
            Command::Look(target) => {
                let locator = Locator::new(&self.model, graph, self.home);
                self.rig.look(target, &mut self.clock, &locator)
            }
            Command::ChangeSpeed(factor) => {
                self.clock.change_speed_by_factor(factor);
                true
            }
            Command::SetSpeed(speed) => self.clock.set_speed(speed),
            Command::TogglePause => {
                self.clock.toggle_pause();
                true
            }
            Command::Reverse => {
                self.clock.reverse();
                true
            }
            Command::JumpTime(days) => {
                if !days.is_finite() || days == 0.0 {
                    return false;
                }
                match TimeDelta::try_milliseconds((days * 86_400_000.0) as i64) {
                    Some(delta) => self.clock.jump_by(delta),
                    None => self.clock.jump_days(days),
                }
                true
            }
            Command::SetTimeNow => {
                self.clock.set_time_now(now);
                self.settle(graph);
                true
            }
            Command::ToggleScale => {
                self.scale.toggle();
                true
            }
            Command::ToggleEarthTilt => self
                .model
                .find(EARTH)
                .and_then(|id| self.model.toggle_tilt(id))
                .is_some(),
            Command::ToggleMoonInclination { hard } => self
                .model
                .find(MOON)
                .and_then(|id| self.model.toggle_inclination(id, hard))
                .is_some(),
            Command::ToggleShadows => toggle(&mut self.decorations.shadows),
            Command::ToggleMarkers => toggle(&mut self.decorations.markers),
            Command::ToggleOrbits => toggle(&mut self.decorations.orbits),
            Command::ToggleStars => toggle(&mut self.decorations.stars),
        }
    }

    // ── Outbound state ───────────────────────────────────────────────

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn model(&self) -> &OrbitalModel {
        &self.model
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn date(&self) -> DateReadout {
        self.clock.now().into()
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn is_reversed(&self) -> bool {
        self.clock.is_reversed()
    }

    pub fn following(&self) -> Option<Target> {
        self.rig.follow_destination()
    }

    pub fn looking(&self) -> Option<Target> {
        self.rig.look_destination()
    }

    pub fn is_travelling(&self) -> bool {
        self.rig.is_travelling()
    }

    pub fn blend(&self) -> f64 {
        self.scale.blend()
    }

    pub fn pose(&self) -> CameraPose {
        self.rig.pose()
    }

    pub fn decorations(&self) -> Decorations {
        self.decorations
    }

    pub fn body_id(&self, name: &str) -> Option<BodyId> {
        self.model.find(name)
    }

    pub fn earth_tilted(&self) -> bool {
        self.model
            .find(EARTH)
            .and_then(|id| self.model.body(id))
            .is_some_and(|b| b.tilted)
    }

    pub fn moon_inclination(&self) -> InclinationMode {
        self.model
            .find(MOON)
            .and_then(|id| self.model.body(id))
            .and_then(|b| b.orbit.as_ref())
            .map_or(InclinationMode::Flat, |o| o.mode)
    }

    /// Whether a body's cast shadow should be drawn this frame.
    pub fn shadow_visible(&self, body: BodyId) -> bool {
        self.decorations.shadows && !self.rig.hides_shadow_of(body)
    }
}

fn toggle(flag: &mut bool) -> bool {
    *flag = !*flag;
    true
}
