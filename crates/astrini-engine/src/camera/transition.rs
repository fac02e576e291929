// camera/transition.rs
//
// Retarget choreography for one camera anchor:
//
//   Idle → Decelerating → Detached → Animating → Reattached → Idle
//
// Decelerating fades a dilation request on the clock down to the minimum
// crawl, so the bodies nearly stop while the anchor leaves its parent.
// Detached frees the anchor at its current world position. Animating eases
// it towards the destination, sampled live every tick because the
// destination keeps moving. Reattached pins the anchor to the destination
// and fades the dilation back out; the lock is already released here, so a
// new retarget may start while time is still speeding up.
//
// Every phase is a fixed-duration tween, so a transition always ends.

use glam::DVec3;

use crate::api::types::Target;
use crate::camera::rig::{AttachmentState, Locator};
use crate::core::config::TransitionConfig;
use crate::core::time::{DilationId, SimulationClock};
use crate::extensions::easing::{lerp_dvec3, Easing};
use crate::extensions::tween::Tween;

/// Which anchor a sequencer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// Camera position.
    Follow,
    /// Camera focus.
    Look,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Decelerating { timer: Tween },
    Detached,
    Animating { from: DVec3, timer: Tween },
    Reattached { timer: Tween },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Decelerating { .. } => "decelerating",
            Phase::Detached => "detached",
            Phase::Animating { .. } => "animating",
            Phase::Reattached { .. } => "reattached",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionSequencer {
    kind: AnchorKind,
    phase: Phase,
    destination: Option<Target>,
    dilation: Option<DilationId>,
    /// Dilation level last written to the clock (1.0 = no slow-down).
    level: f64,
    freeze_secs: f64,
    travel_secs: f64,
    speed_easing: Easing,
    travel_easing: Easing,
}

impl TransitionSequencer {
    pub fn new(kind: AnchorKind, config: &TransitionConfig) -> Self {
        Self {
            kind,
            phase: Phase::Idle,
            destination: None,
            dilation: None,
            level: 1.0,
            freeze_secs: config.freeze_secs,
            travel_secs: config.travel_secs,
            speed_easing: config.speed_easing,
            travel_easing: config.travel_easing,
        }
    }

    pub fn kind(&self) -> AnchorKind {
        self.kind
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Held from the retarget until the anchor is reattached.
    pub fn is_locked(&self) -> bool {
        matches!(
            self.phase,
            Phase::Decelerating { .. } | Phase::Detached | Phase::Animating { .. }
        )
    }

    /// Target of the transition in flight, if any.
    pub fn destination(&self) -> Option<Target> {
        self.destination
    }

    /// Begin moving the anchor to `target`. Rejected when `target` is
    /// already held or in flight, or while the lock is held.
    pub fn retarget(
        &mut self,
        target: Target,
        current: Option<Target>,
        clock: &mut SimulationClock,
    ) -> bool {
        if self.is_locked() {
            log::debug!(
                "{:?}: rejecting {:?}, {} to {:?}",
                self.kind,
                target,
                self.phase.name(),
                self.destination
            );
            return false;
        }
        if current == Some(target) {
            log::debug!("{:?}: already on {:?}", self.kind, target);
            return false;
        }

        let id = match self.dilation {
            Some(id) => id,
            None => {
                let id = clock.request_dilation();
                self.dilation = Some(id);
                id
            }
        };
        clock.set_dilation(id, self.level);
        // A retarget during Reattached starts from the partly restored level.
        let timer = Tween::new(self.level, 0.0, self.freeze_secs, self.speed_easing);
        self.destination = Some(target);
        self.set_phase(Phase::Decelerating { timer });
        true
    }

    /// Advance one frame. Returns the destination on the tick the anchor is
    /// reattached, which is when it becomes the current target.
    pub fn tick(
        &mut self,
        dt: f64,
        anchor: &mut AttachmentState,
        locator: &Locator<'_>,
        clock: &mut SimulationClock,
    ) -> Option<Target> {
        match self.phase {
            Phase::Idle => None,
            Phase::Decelerating { mut timer } => {
                self.level = timer.tick(dt);
                self.write_level(clock);
                if timer.is_complete() {
                    let here = anchor.world_position(locator).unwrap_or(DVec3::ZERO);
                    *anchor = AttachmentState::Free(here);
                    self.set_phase(Phase::Detached);
                } else {
                    self.phase = Phase::Decelerating { timer };
                }
                None
            }
            Phase::Detached => {
                let from = anchor.world_position(locator).unwrap_or(DVec3::ZERO);
                self.set_phase(Phase::Animating {
                    from,
                    timer: Tween::unit(self.travel_secs, self.travel_easing),
                });
                None
            }
            Phase::Animating { from, mut timer } => {
                timer.tick(dt);
                let Some(target) = self.destination else {
                    self.set_phase(Phase::Reattached { timer: self.restore_timer() });
                    return None;
                };
                if timer.is_complete() {
                    *anchor = AttachmentState::AttachedTo { target, offset: DVec3::ZERO };
                    self.set_phase(Phase::Reattached { timer: self.restore_timer() });
                    Some(target)
                } else {
                    let to = locator.target_position(target).unwrap_or(from);
                    *anchor = AttachmentState::Free(lerp_dvec3(from, to, timer.eased()));
                    self.phase = Phase::Animating { from, timer };
                    None
                }
            }
            Phase::Reattached { mut timer } => {
                self.level = timer.tick(dt);
                self.write_level(clock);
                if timer.is_complete() {
                    if let Some(id) = self.dilation.take() {
                        clock.release_dilation(id);
                    }
                    self.level = 1.0;
                    self.destination = None;
                    self.set_phase(Phase::Idle);
                } else {
                    self.phase = Phase::Reattached { timer };
                }
                None
            }
        }
    }

    fn restore_timer(&self) -> Tween {
        Tween::new(self.level, 1.0, self.freeze_secs, self.speed_easing)
    }

    fn write_level(&self, clock: &mut SimulationClock) {
        if let Some(id) = self.dilation {
            clock.set_dilation(id, self.level);
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        log::debug!("{:?}: {} -> {}", self.kind, self.phase.name(), phase.name());
        self.phase = phase;
    }
}
