// core/time.rs
//
// Simulated calendar time and its rate of advance, plus the fixed timestep
// accumulator the runner uses to drive frames.
//
// Speed is in simulated seconds per real second. The user sets it; camera
// transitions temporarily damp it through dilation requests, which compose:
// the strongest request wins and the user speed comes back untouched once
// every request is released.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::core::config::ClockConfig;
use crate::extensions::easing::{lerp, Easing};
use crate::extensions::tween::Tween;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Julian day of 1970-01-01T00:00:00 UTC.
pub const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;

/// Earliest representable simulated instant: 0001-01-01T00:00:00.
pub fn earliest() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Latest representable simulated instant: 9999-12-31T23:59:59.999999999.
pub fn latest() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Continuous day count (UTC, proleptic Gregorian) for an instant.
pub fn julian_day(t: NaiveDateTime) -> f64 {
    let utc = t.and_utc();
    let seconds = utc.timestamp() as f64 + utc.timestamp_subsec_nanos() as f64 * 1e-9;
    seconds / SECONDS_PER_DAY + UNIX_EPOCH_JULIAN_DAY
}

/// Convert fractional seconds to a `TimeDelta`, falling back to whole
/// seconds once the nanosecond count no longer fits an i64.
fn delta_from_seconds(seconds: f64) -> Option<TimeDelta> {
    if !seconds.is_finite() {
        return None;
    }
    let nanos = seconds * 1e9;
    if nanos.abs() < i64::MAX as f64 {
        Some(TimeDelta::nanoseconds(nanos as i64))
    } else if seconds.abs() < i64::MAX as f64 / 1000.0 {
        TimeDelta::try_seconds(seconds as i64)
    } else {
        None
    }
}

fn delta_seconds(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + delta.subsec_nanos() as f64 * 1e-9
}

/// Which end of the representable range an offset ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Earliest,
    Latest,
}

/// Move `t` by `seconds`, reporting the bound hit on overflow.
fn offset(t: NaiveDateTime, seconds: f64) -> Result<NaiveDateTime, TimeBound> {
    let bound = if seconds < 0.0 { TimeBound::Earliest } else { TimeBound::Latest };
    let moved = delta_from_seconds(seconds)
        .and_then(|d| t.checked_add_signed(d))
        .ok_or(bound)?;
    if moved > latest() {
        Err(TimeBound::Latest)
    } else if moved < earliest() {
        Err(TimeBound::Earliest)
    } else {
        Ok(moved)
    }
}

fn clamp_time(t: NaiveDateTime) -> NaiveDateTime {
    t.clamp(earliest(), latest())
}

/// Handle to an active slow-down request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DilationId(u32);

#[derive(Debug, Clone, Copy)]
struct Dilation {
    id: DilationId,
    /// 1.0 = user speed, 0.0 = slowed to the minimum crawl.
    level: f64,
}

/// A smooth calendar jump between two absolute endpoints.
#[derive(Debug, Clone, Copy)]
struct TimeJump {
    from: NaiveDateTime,
    to: NaiveDateTime,
    timer: Tween,
}

/// Simulated wall-clock time.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    current: NaiveDateTime,
    /// User speed; the minimum crawl while paused.
    speed: f64,
    /// Speed remembered across a pause.
    paused_speed: Option<f64>,
    /// Mirrors the sign of the user speed, for the UI.
    reverse: bool,
    max_speed: f64,
    min_speed: f64,
    dilations: Vec<Dilation>,
    next_dilation: u32,
    jump: Option<TimeJump>,
    jump_secs: f64,
    jump_easing: Easing,
}

impl SimulationClock {
    /// Clock at `start` using validated clock settings.
    pub fn new(config: &ClockConfig, start: NaiveDateTime) -> Self {
        let mut clock = Self {
            current: clamp_time(start),
            speed: 1.0,
            paused_speed: None,
            reverse: false,
            max_speed: config.max_speed,
            min_speed: config.min_speed,
            dilations: Vec::new(),
            next_dilation: 0,
            jump: None,
            jump_secs: config.jump_secs,
            jump_easing: config.jump_easing,
        };
        let initial = clock.bounded(config.initial_speed);
        clock.store_speed(initial);
        clock
    }

    // ── Readout ──────────────────────────────────────────────────────

    pub fn now(&self) -> NaiveDateTime {
        self.current
    }

    pub fn julian_day(&self) -> f64 {
        julian_day(self.current)
    }

    /// Effective speed: the user speed damped by any active dilation.
    pub fn speed(&self) -> f64 {
        let level = match self.dilation_level() {
            Some(level) if level < 1.0 => level,
            _ => return self.speed,
        };
        let crawl = self.min_speed.copysign(self.speed);
        lerp(crawl, self.speed, level)
    }

    /// Speed chosen by the user, ignoring dilation.
    pub fn user_speed(&self) -> f64 {
        self.speed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn min_speed(&self) -> f64 {
        self.min_speed
    }

    pub fn is_paused(&self) -> bool {
        self.paused_speed.is_some()
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_some()
    }

    // ── Frame tick ───────────────────────────────────────────────────

    /// Advance by `real_dt` seconds at the effective speed, then progress
    /// any calendar jump. Hitting a calendar bound clamps to it and drops the
    /// speed to the minimum crawl in the same direction.
    pub fn advance(&mut self, real_dt: f64) {
        if !real_dt.is_finite() || real_dt <= 0.0 {
            return;
        }
        let step = real_dt * self.speed();

        match offset(self.current, step) {
            Ok(t) => self.current = t,
            Err(bound) => {
                self.hit_bound(bound);
            }
        }

        let Some(mut jump) = self.jump.take() else { return };
        // Flowing time carries both endpoints along.
        jump.from = offset(jump.from, step).unwrap_or_else(|b| self.bound_time(b));
        jump.to = offset(jump.to, step).unwrap_or_else(|b| self.bound_time(b));
        jump.timer.tick(real_dt);

        if jump.timer.is_complete() {
            self.current = jump.to;
        } else {
            let span = delta_seconds(jump.to.signed_duration_since(jump.from));
            self.current = offset(jump.from, span * jump.timer.eased())
                .unwrap_or_else(|b| self.bound_time(b));
            self.jump = Some(jump);
        }
    }

    fn bound_time(&self, bound: TimeBound) -> NaiveDateTime {
        match bound {
            TimeBound::Earliest => earliest(),
            TimeBound::Latest => latest(),
        }
    }

    /// Pin the clock at `bound`. Returns true when it was not already there.
    fn hit_bound(&mut self, bound: TimeBound) -> bool {
        let pinned = self.bound_time(bound);
        let arrived = self.current != pinned;
        self.current = pinned;
        let crawl = match bound {
            TimeBound::Earliest => -self.min_speed,
            TimeBound::Latest => self.min_speed,
        };
        if arrived {
            log::warn!("clock: reached {:?} bound, crawling at {}", bound, crawl);
        }
        if self.paused_speed.is_some() {
            self.paused_speed = Some(crawl);
        }
        self.speed = crawl;
        self.reverse = crawl < 0.0;
        arrived
    }

    // ── User commands ────────────────────────────────────────────────

    /// Set the user speed. Requests beyond ±max are ignored.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !speed.is_finite() || speed.abs() > self.max_speed {
            log::warn!("clock: ignoring speed {} (max {})", speed, self.max_speed);
            return false;
        }
        let speed = self.bounded(speed);
        self.store_speed(speed);
        true
    }

    /// Multiply the user (or pre-pause) speed by `factor`, clamped to ±max.
    pub fn change_speed_by_factor(&mut self, factor: f64) {
        if !factor.is_finite() || factor == 0.0 {
            log::warn!("clock: ignoring speed factor {}", factor);
            return;
        }
        let base = self.paused_speed.unwrap_or(self.speed);
        let speed = self.bounded(base * factor);
        self.store_speed(speed);
    }

    /// Flip the direction of time.
    pub fn reverse(&mut self) {
        self.change_speed_by_factor(-1.0);
    }

    /// Pause to the minimum crawl, or resume the remembered speed.
    pub fn toggle_pause(&mut self) {
        match self.paused_speed.take() {
            Some(previous) => self.speed = previous,
            None => {
                self.paused_speed = Some(self.speed);
                self.speed = self.min_speed.copysign(self.speed);
            }
        }
    }

    /// Start a smooth jump of `delta` from the current instant. A jump
    /// requested mid-jump starts from where time is now and extends the
    /// previous destination, so repeated jumps never lose or gain time.
    pub fn jump_by(&mut self, delta: TimeDelta) {
        let destination = self.jump.map(|j| j.to).unwrap_or(self.current);
        let to = destination
            .checked_add_signed(delta)
            .map(clamp_time)
            .unwrap_or_else(|| {
                if delta < TimeDelta::zero() { earliest() } else { latest() }
            });
        self.jump = Some(TimeJump {
            from: self.current,
            to,
            timer: Tween::unit(self.jump_secs, self.jump_easing),
        });
    }

    /// [`jump_by`](Self::jump_by) with a day count.
    pub fn jump_days(&mut self, days: f64) {
        match delta_from_seconds(days * SECONDS_PER_DAY) {
            Some(delta) => self.jump_by(delta),
            None => self.jump_by(if days < 0.0 { TimeDelta::MIN } else { TimeDelta::MAX }),
        }
    }

    /// Jump immediately to `t` (clamped), cancelling any smooth jump.
    pub fn set_time(&mut self, t: NaiveDateTime) {
        self.jump = None;
        self.current = clamp_time(t);
    }

    /// Back to the present: real-time speed, unpaused.
    pub fn set_time_now(&mut self, now: NaiveDateTime) {
        self.set_time(now);
        self.paused_speed = None;
        let speed = self.bounded(1.0);
        self.store_speed(speed);
    }

    // ── Dilation ─────────────────────────────────────────────────────

    /// Open a slow-down request at level 1.0 (no effect yet).
    pub fn request_dilation(&mut self) -> DilationId {
        let id = DilationId(self.next_dilation);
        self.next_dilation = self.next_dilation.wrapping_add(1);
        self.dilations.push(Dilation { id, level: 1.0 });
        id
    }

    /// Set a request's level: 1.0 = user speed, 0.0 = minimum crawl.
    pub fn set_dilation(&mut self, id: DilationId, level: f64) {
        if let Some(d) = self.dilations.iter_mut().find(|d| d.id == id) {
            d.level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 1.0 };
        }
    }

    pub fn release_dilation(&mut self, id: DilationId) {
        self.dilations.retain(|d| d.id != id);
    }

    /// Strongest active slow-down, if any.
    pub fn dilation_level(&self) -> Option<f64> {
        self.dilations.iter().map(|d| d.level).reduce(f64::min)
    }

    pub fn active_dilations(&self) -> usize {
        self.dilations.len()
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Clamp magnitude into [min, max], keeping the sign.
    fn bounded(&self, speed: f64) -> f64 {
        speed.abs().clamp(self.min_speed, self.max_speed).copysign(speed)
    }

    fn store_speed(&mut self, speed: f64) {
        if self.paused_speed.is_some() {
            self.paused_speed = Some(speed);
        } else {
            self.speed = speed;
        }
        self.reverse = speed < 0.0;
    }
}

/// Fixed timestep accumulator.
/// Ensures simulation ticks run at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    dt: f64,
    accumulator: f64,
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f64) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 || self.dt <= 0.0 {
            return 0;
        }
        // Cap to prevent a spiral of death after a stalled tab.
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * self.max_steps as f64);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f64 * self.dt;
        steps
    }

    /// Fraction of a step left in the accumulator (0.0 to 1.0).
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}
