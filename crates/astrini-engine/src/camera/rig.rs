// camera/rig.rs
//
// The camera rig: a "hook" anchor the camera sits on and a "focus" anchor it
// looks at. Each anchor is either free at a world position or attached to a
// target with an offset; its world position is computed from that tag and
// the placed bodies, never stored in the scene graph.
//
// Usage:
//   let loc = Locator::new(&model, &graph, home);
//   rig.follow(Some(Target::Body(moon)), &mut clock, &loc);
//   rig.tick(dt, &mut clock, &loc);   // after the bodies are placed
//   let pose = rig.pose();

use glam::DVec3;

use crate::api::types::{BodyId, Target};
use crate::camera::transition::{AnchorKind, TransitionSequencer};
use crate::core::config::{CameraConfig, ConfigError, TransitionConfig, HOME};
use crate::core::scene::SceneGraph;
use crate::core::time::SimulationClock;
use crate::sim::orbit::OrbitalModel;

/// Resolves targets to world positions for the current frame.
#[derive(Clone, Copy)]
pub struct Locator<'a> {
    pub model: &'a OrbitalModel,
    pub graph: &'a SceneGraph,
    pub home: DVec3,
}

impl<'a> Locator<'a> {
    pub fn new(model: &'a OrbitalModel, graph: &'a SceneGraph, home: DVec3) -> Self {
        Self { model, graph, home }
    }

    pub fn target_position(&self, target: Target) -> Option<DVec3> {
        match target {
            Target::Home => Some(self.home),
            Target::Body(id) => self.model.world_position(id, self.graph),
        }
    }

    pub fn contains(&self, target: Target) -> bool {
        match target {
            Target::Home => true,
            Target::Body(id) => self.model.body(id).is_some(),
        }
    }
}

/// Where an anchor is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttachmentState {
    /// Fixed world position.
    Free(DVec3),
    /// Rigidly follows `target`, displaced by a world-axis `offset`.
    AttachedTo { target: Target, offset: DVec3 },
}

impl AttachmentState {
    pub fn world_position(&self, locator: &Locator<'_>) -> Option<DVec3> {
        match *self {
            AttachmentState::Free(p) => Some(p),
            AttachmentState::AttachedTo { target, offset } => {
                locator.target_position(target).map(|p| p + offset)
            }
        }
    }

    pub fn attached_target(&self) -> Option<Target> {
        match *self {
            AttachmentState::Free(_) => None,
            AttachmentState::AttachedTo { target, .. } => Some(target),
        }
    }
}

/// What the renderer needs to place the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    /// Point to orient towards, when looking at something.
    pub look_at: Option<DVec3>,
    pub fov_deg: f64,
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    hook: AttachmentState,
    focus: AttachmentState,
    following: Option<Target>,
    looking: Option<Target>,
    follow_seq: TransitionSequencer,
    look_seq: TransitionSequencer,
    pose: CameraPose,
}

impl CameraRig {
    pub fn new(
        camera: &CameraConfig,
        transitions: &TransitionConfig,
        model: &OrbitalModel,
        home: DVec3,
    ) -> Result<Self, ConfigError> {
        let following = camera
            .initial_follow
            .as_deref()
            .map(|name| resolve(name, model))
            .transpose()?;
        let looking = camera
            .initial_look
            .as_deref()
            .map(|name| resolve(name, model))
            .transpose()?;
        if looking == Some(Target::Home) {
            return Err(ConfigError::UnknownTarget(HOME.to_string()));
        }

        let hook = match following {
            Some(target) => AttachmentState::AttachedTo { target, offset: DVec3::ZERO },
            None => AttachmentState::Free(home),
        };
        let focus = match looking {
            Some(target) => AttachmentState::AttachedTo { target, offset: DVec3::ZERO },
            None => AttachmentState::Free(DVec3::ZERO),
        };

        Ok(Self {
            hook,
            focus,
            following,
            looking,
            follow_seq: TransitionSequencer::new(AnchorKind::Follow, transitions),
            look_seq: TransitionSequencer::new(AnchorKind::Look, transitions),
            pose: CameraPose { position: home, look_at: None, fov_deg: camera.fov_deg },
        })
    }

    // ── State ────────────────────────────────────────────────────────

    /// Target the hook is attached to (updated when a transition reattaches).
    pub fn following(&self) -> Option<Target> {
        self.following
    }

    pub fn looking(&self) -> Option<Target> {
        self.looking
    }

    /// Where the hook is headed: the in-flight target, else the held one.
    pub fn follow_destination(&self) -> Option<Target> {
        if self.follow_seq.is_locked() {
            self.follow_seq.destination()
        } else {
            self.following
        }
    }

    pub fn look_destination(&self) -> Option<Target> {
        if self.look_seq.is_locked() {
            self.look_seq.destination()
        } else {
            self.looking
        }
    }

    /// A follow transition holds its lock.
    pub fn is_travelling(&self) -> bool {
        self.follow_seq.is_locked()
    }

    pub fn is_focus_travelling(&self) -> bool {
        self.look_seq.is_locked()
    }

    pub fn hook(&self) -> &AttachmentState {
        &self.hook
    }

    pub fn focus(&self) -> &AttachmentState {
        &self.focus
    }

    pub fn follow_sequencer(&self) -> &TransitionSequencer {
        &self.follow_seq
    }

    pub fn look_sequencer(&self) -> &TransitionSequencer {
        &self.look_seq
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// A body's cast shadow is hidden while the camera sits on that body.
    pub fn hides_shadow_of(&self, body: BodyId) -> bool {
        self.hook.attached_target() == Some(Target::Body(body))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Move the camera onto `target`, or stop following with `None`.
    pub fn follow(
        &mut self,
        target: Option<Target>,
        clock: &mut SimulationClock,
        locator: &Locator<'_>,
    ) -> bool {
        let Some(target) = target else {
            return self.stop(AnchorKind::Follow, locator);
        };
        if !locator.contains(target) {
            log::debug!("follow: unknown target {:?}", target);
            return false;
        }
        let previous = self.following;
        let displaced = if self.look_destination() == Some(target) {
            // The focus has to leave `target`, which it cannot do mid-travel.
            if self.look_seq.is_locked() {
                log::debug!("follow: focus still travelling to {:?}", target);
                return false;
            }
            match replacement(target, previous, locator.model) {
                Some(other) => Some(other),
                None => return false,
            }
        } else {
            None
        };
        if !self.follow_seq.retarget(target, self.following, clock) {
            return false;
        }
        log::debug!("follow: {:?} -> {:?}", previous, target);
        if let Some(other) = displaced {
            self.look(Some(other), clock, locator);
        }
        true
    }

    /// Turn the camera towards `target`, or stop looking with `None`.
    /// Home is a place to stand, not something to look at.
    pub fn look(
        &mut self,
        target: Option<Target>,
        clock: &mut SimulationClock,
        locator: &Locator<'_>,
    ) -> bool {
        let Some(target) = target else {
            return self.stop(AnchorKind::Look, locator);
        };
        if target == Target::Home || !locator.contains(target) {
            log::debug!("look: cannot look at {:?}", target);
            return false;
        }
        let previous = self.looking;
        let displaced = if self.follow_destination() == Some(target) {
            if self.follow_seq.is_locked() {
                log::debug!("look: hook still travelling to {:?}", target);
                return false;
            }
            match replacement(target, previous, locator.model) {
                Some(other) => Some(other),
                None => return false,
            }
        } else {
            None
        };
        if !self.look_seq.retarget(target, self.looking, clock) {
            return false;
        }
        log::debug!("look: {:?} -> {:?}", previous, target);
        if let Some(other) = displaced {
            self.follow(Some(other), clock, locator);
        }
        true
    }

    /// Free an anchor where it stands. Refused mid-travel.
    fn stop(&mut self, kind: AnchorKind, locator: &Locator<'_>) -> bool {
        let (anchor, seq, held) = match kind {
            AnchorKind::Follow => (&mut self.hook, &self.follow_seq, &mut self.following),
            AnchorKind::Look => (&mut self.focus, &self.look_seq, &mut self.looking),
        };
        if seq.is_locked() || held.is_none() {
            return false;
        }
        let here = anchor.world_position(locator).unwrap_or(DVec3::ZERO);
        *anchor = AttachmentState::Free(here);
        *held = None;
        log::debug!("{:?}: stopped at {}", kind, here);
        true
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Advance both transitions and recompute the pose. Bodies must already
    /// be placed for this frame.
    pub fn tick(&mut self, dt: f64, clock: &mut SimulationClock, locator: &Locator<'_>) {
        if let Some(target) = self.follow_seq.tick(dt, &mut self.hook, locator, clock) {
            self.following = Some(target);
        }
        if let Some(target) = self.look_seq.tick(dt, &mut self.focus, locator, clock) {
            self.looking = Some(target);
        }
        self.update_pose(locator);
    }

    pub fn update_pose(&mut self, locator: &Locator<'_>) {
        if let Some(position) = self.hook.world_position(locator) {
            self.pose.position = position;
        }
        self.pose.look_at = if self.looking.is_some() || self.look_seq.is_locked() {
            self.focus.world_position(locator)
        } else {
            None
        };
    }
}

/// Resolve a configured target name.
pub fn resolve(name: &str, model: &OrbitalModel) -> Result<Target, ConfigError> {
    if name == HOME {
        return Ok(Target::Home);
    }
    model
        .find(name)
        .map(Target::Body)
        .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))
}

/// New target for the other anchor when both would land on `taken`: the
/// previous body if there was one, otherwise the first other body.
fn replacement(taken: Target, previous: Option<Target>, model: &OrbitalModel) -> Option<Target> {
    if let Some(Target::Body(id)) = previous {
        if Target::Body(id) != taken {
            return Some(Target::Body(id));
        }
    }
    model.ids().map(Target::Body).find(|t| *t != taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::transition::Phase;
    use crate::core::config::SimConfig;
    use crate::sim::bodies::{EARTH, MOON, SUN};
    use chrono::NaiveDate;

    const DT: f64 = 1.0 / 60.0;

    struct Fixture {
        config: SimConfig,
        model: OrbitalModel,
        graph: SceneGraph,
        clock: SimulationClock,
        rig: CameraRig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SimConfig::default();
            let mut graph = SceneGraph::new();
            let model = OrbitalModel::build(&config, &mut graph).unwrap();
            let start = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
            let mut clock = SimulationClock::new(&config.clock, start);
            clock.set_speed(600.0);
            model.place(clock.julian_day(), &mut graph);
            graph.propagate();
            let home = config.home_position();
            let rig = CameraRig::new(&config.camera, &config.transitions, &model, home).unwrap();
            Self { config, model, graph, clock, rig }
        }

        fn body(&self, name: &str) -> Target {
            Target::Body(self.model.find(name).unwrap())
        }

        fn follow(&mut self, target: Option<Target>) -> bool {
            let loc = Locator::new(&self.model, &self.graph, self.config.home_position());
            self.rig.follow(target, &mut self.clock, &loc)
        }

        fn look(&mut self, target: Option<Target>) -> bool {
            let loc = Locator::new(&self.model, &self.graph, self.config.home_position());
            self.rig.look(target, &mut self.clock, &loc)
        }

        fn run(&mut self, frames: usize) {
            for _ in 0..frames {
                self.clock.advance(DT);
                self.model.place(self.clock.julian_day(), &mut self.graph);
                self.graph.propagate();
                let loc = Locator::new(&self.model, &self.graph, self.config.home_position());
                self.rig.tick(DT, &mut self.clock, &loc);
            }
        }
    }

    #[test]
    fn starts_at_home_looking_at_the_sun() {
        let fx = Fixture::new();
        assert_eq!(fx.rig.following(), Some(Target::Home));
        assert_eq!(fx.rig.looking(), Some(fx.body(SUN)));
        assert!(!fx.rig.is_travelling());
    }

    #[test]
    fn following_the_held_target_changes_nothing() {
        let mut fx = Fixture::new();
        let before = fx.rig.clone();
        assert!(!fx.follow(Some(Target::Home)));
        assert!(!fx.rig.is_travelling());
        assert_eq!(fx.rig.hook(), before.hook());
        assert_eq!(fx.clock.active_dilations(), 0);
    }

    #[test]
    fn second_follow_in_flight_is_rejected() {
        let mut fx = Fixture::new();
        let moon = fx.body(MOON);
        let earth = fx.body(EARTH);
        assert!(fx.follow(Some(moon)));
        fx.run(3);
        assert!(fx.rig.is_travelling());
        assert!(!fx.follow(Some(earth)));
        assert_eq!(fx.rig.follow_destination(), Some(moon));

        fx.run(120);
        assert_eq!(fx.rig.following(), Some(moon));
        assert!(!fx.rig.is_travelling());
    }

    #[test]
    fn completed_follow_restores_the_user_speed() {
        let mut fx = Fixture::new();
        let earth = fx.body(EARTH);
        let before = fx.clock.speed();
        fx.follow(Some(earth));
        fx.run(120);
        assert_eq!(fx.rig.following(), Some(earth));
        assert!(!fx.rig.is_travelling());
        assert_eq!(fx.clock.speed(), before);
    }

    #[test]
    fn overlapping_follow_and_look_restore_the_user_speed() {
        let mut fx = Fixture::new();
        let before = fx.clock.speed();
        let earth = fx.body(EARTH);
        let moon = fx.body(MOON);
        fx.follow(Some(earth));
        fx.run(7);
        fx.look(Some(moon));
        for _ in 0..40 {
            fx.run(1);
            // Neither restore may overshoot while the other still holds.
            assert!(fx.clock.speed() <= before);
        }
        fx.run(200);
        assert_eq!(fx.rig.following(), Some(earth));
        assert_eq!(fx.rig.looking(), Some(moon));
        assert_eq!(fx.clock.speed(), before);
        assert_eq!(fx.clock.active_dilations(), 0);
    }

    #[test]
    fn following_the_looked_at_body_moves_the_focus() {
        let mut fx = Fixture::new();
        let sun = fx.body(SUN);
        // Previous follow target is home, so the focus goes to the first other body.
        assert!(fx.follow(Some(sun)));
        assert_eq!(fx.rig.look_destination(), Some(fx.body(EARTH)));
    }

    #[test]
    fn follow_is_refused_while_the_focus_travels_to_that_body() {
        let mut fx = Fixture::new();
        let earth = fx.body(EARTH);
        assert!(fx.look(Some(earth)));
        assert!(!fx.follow(Some(earth)));
        assert!(!fx.rig.is_travelling());
        fx.run(200);
        assert_eq!(fx.rig.following(), Some(Target::Home));
        assert_eq!(fx.rig.looking(), Some(earth));
        let pose = fx.rig.pose();
        assert!((pose.position - pose.look_at.unwrap()).length() > 1.0);
    }

    #[test]
    fn look_is_refused_while_the_hook_travels_to_that_body() {
        let mut fx = Fixture::new();
        let moon = fx.body(MOON);
        assert!(fx.follow(Some(moon)));
        fx.run(3);
        assert!(!fx.look(Some(moon)));
        assert_eq!(fx.rig.look_destination(), Some(fx.body(SUN)));
        fx.run(200);
        assert_ne!(fx.rig.following(), fx.rig.looking());
    }

    #[test]
    fn looking_at_the_followed_body_moves_the_hook_back() {
        let mut fx = Fixture::new();
        let earth = fx.body(EARTH);
        let moon = fx.body(MOON);
        fx.follow(Some(earth));
        fx.run(120);
        fx.look(Some(moon));
        fx.run(120);
        // Looking at earth while sitting on it: the hook returns to the
        // previously looked-at body.
        assert!(fx.look(Some(earth)));
        assert_eq!(fx.rig.follow_destination(), Some(moon));
    }

    #[test]
    fn home_cannot_be_looked_at() {
        let mut fx = Fixture::new();
        assert!(!fx.look(Some(Target::Home)));
        assert!(!fx.rig.is_focus_travelling());
    }

    #[test]
    fn stop_following_frees_the_hook_in_place() {
        let mut fx = Fixture::new();
        let earth = fx.body(EARTH);
        fx.follow(Some(earth));
        fx.run(120);
        let here = fx.rig.pose().position;
        assert!(fx.follow(None));
        assert_eq!(fx.rig.following(), None);
        assert_eq!(fx.rig.hook(), &AttachmentState::Free(here));
        // Nothing to stop twice.
        assert!(!fx.follow(None));
    }

    #[test]
    fn stopping_during_the_restore_reports_no_target() {
        let mut fx = Fixture::new();
        let earth = fx.body(EARTH);
        fx.follow(Some(earth));
        for _ in 0..200 {
            if fx.rig.following() == Some(earth) {
                break;
            }
            fx.run(1);
        }
        assert!(matches!(fx.rig.follow_sequencer().phase(), Phase::Reattached { .. }));
        assert!(fx.follow(None));
        assert_eq!(fx.rig.follow_destination(), None);
        fx.run(120);
        assert_eq!(fx.rig.follow_destination(), None);
        assert_eq!(fx.clock.active_dilations(), 0);
    }

    #[test]
    fn stop_is_refused_mid_travel() {
        let mut fx = Fixture::new();
        fx.follow(Some(fx.body(MOON)));
        fx.run(2);
        assert!(!fx.follow(None));
        assert!(fx.rig.is_travelling());
    }

    #[test]
    fn pose_tracks_the_followed_body() {
        let mut fx = Fixture::new();
        let moon = fx.model.find(MOON).unwrap();
        fx.follow(Some(Target::Body(moon)));
        fx.run(150);
        let moon_pos = fx.model.world_position(moon, &fx.graph).unwrap();
        assert!((fx.rig.pose().position - moon_pos).length() < 1e-9);
        let sun_pos = fx.model.world_position(fx.model.find(SUN).unwrap(), &fx.graph).unwrap();
        assert!((fx.rig.pose().look_at.unwrap() - sun_pos).length() < 1e-9);
    }

    #[test]
    fn followed_body_hides_its_shadow() {
        let mut fx = Fixture::new();
        let earth = fx.model.find(EARTH).unwrap();
        assert!(!fx.rig.hides_shadow_of(earth));
        fx.follow(Some(Target::Body(earth)));
        fx.run(120);
        assert!(fx.rig.hides_shadow_of(earth));
        fx.follow(None);
        assert!(!fx.rig.hides_shadow_of(earth));
    }

    #[test]
    fn unknown_initial_target_is_a_config_error() {
        let config = SimConfig::default();
        let mut graph = SceneGraph::new();
        let model = OrbitalModel::build(&config, &mut graph).unwrap();
        let mut camera = config.camera.clone();
        camera.initial_follow = Some("pluto".into());
        let err = CameraRig::new(&camera, &config.transitions, &model, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget(name) if name == "pluto"));
    }
}
