// extensions/tween.rs
//
// Fixed-duration scalar tweens. Every timed animation in the simulation
// (speed fades, anchor travel, scale blend, calendar jumps) is one of these:
// progress is derived from accumulated real time, so each animation ends
// after a bounded number of ticks no matter what else happens in the frame.
//
// Usage:
//   let mut fade = Tween::new(1.0, 0.0, 0.2, Easing::SmoothStep);
//   let level = fade.tick(dt);   // advance and read
//   if fade.is_complete() { ... }

use super::easing::{ease, Easing};

/// A single scalar animation from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Elapsed time.
    pub elapsed: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    /// A 0 → 1 tween, used as a phase timer whose eased value drives
    /// interpolation between endpoints that live elsewhere.
    pub fn unit(duration: f64, easing: Easing) -> Self {
        Self::new(0.0, 1.0, duration, easing)
    }

    /// Advance by `dt` real seconds and return the new value.
    /// Negative or non-finite deltas do not move the tween.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
        }
        self.value()
    }

    /// Normalized linear progress [0, 1].
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Eased progress [0, 1].
    pub fn eased(&self) -> f64 {
        self.easing.apply(self.progress())
    }

    /// Current value. Returns `to` exactly once complete.
    pub fn value(&self) -> f64 {
        if self.is_complete() {
            self.to
        } else {
            ease(self.from, self.to, self.progress(), self.easing)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_tween_reaches_midpoint_and_end() {
        let mut t = Tween::new(0.0, 100.0, 1.0, Easing::Linear);
        assert!((t.tick(0.5) - 50.0).abs() < 1e-9);
        assert!(!t.is_complete());
        assert_eq!(t.tick(0.5), 100.0);
        assert!(t.is_complete());
    }

    #[test]
    fn overshooting_tick_ends_exactly_on_target() {
        let mut t = Tween::new(3.0, 7.25, 0.2, Easing::SmoothStep);
        assert_eq!(t.tick(10.0), 7.25);
        assert_eq!(t.elapsed, 0.2);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let t = Tween::new(1.0, 2.0, 0.0, Easing::Linear);
        assert!(t.is_complete());
        assert_eq!(t.value(), 2.0);
    }

    #[test]
    fn bogus_deltas_are_ignored() {
        let mut t = Tween::unit(1.0, Easing::Linear);
        t.tick(-1.0);
        t.tick(f64::NAN);
        assert_eq!(t.elapsed, 0.0);
    }

    #[test]
    fn completes_in_bounded_ticks() {
        let mut t = Tween::unit(1.0, Easing::SmoothStep);
        let mut ticks = 0;
        while !t.is_complete() {
            t.tick(1.0 / 60.0);
            ticks += 1;
            assert!(ticks <= 61);
        }
    }
}
