// extensions/easing.rs
//
// Easing curves for the timed interpolations (speed fades, anchor travel,
// scale blend, calendar jumps). Pure math, f64 throughout because the
// interpolated quantities include timestamps and astronomical distances.

use std::f64::consts::PI;
use serde::{Deserialize, Serialize};

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant velocity (no easing).
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    /// Stronger slow start and end.
    CubicInOut,
    /// Sine wave easing (smooth).
    SineInOut,
    /// Hermite smoothstep `3t² - 2t³`, the classic "ease in/out" blend.
    #[default]
    SmoothStep,
}

impl Easing {
    /// Apply the easing function to a normalized time value `t`.
    /// Input is clamped to [0, 1]; every curve here maps 0 to 0 and 1 to 1
    /// and stays inside [0, 1].
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linearly interpolate between two points.
#[inline]
pub fn lerp_dvec3(a: glam::DVec3, b: glam::DVec3, t: f64) -> glam::DVec3 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f64, b: f64, t: f64, easing: Easing) -> f64 {
    lerp(a, b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicInOut,
        Easing::SineInOut,
        Easing::SmoothStep,
    ];

    #[test]
    fn endpoints_are_exact() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?} at 1");
        }
    }

    #[test]
    fn in_out_curves_are_symmetric_at_midpoint() {
        let in_out = [Easing::QuadInOut, Easing::CubicInOut, Easing::SineInOut, Easing::SmoothStep];
        for easing in in_out {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn input_outside_unit_range_is_clamped() {
        assert_eq!(Easing::SmoothStep.apply(-3.0), 0.0);
        assert_eq!(Easing::SmoothStep.apply(7.0), 1.0);
    }

    #[test]
    fn curves_stay_in_unit_range() {
        for easing in ALL {
            for i in 0..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!((0.0..=1.0).contains(&v), "{easing:?} gave {v}");
            }
        }
    }

    #[test]
    fn ease_interpolates() {
        let result = ease(100.0, 200.0, 0.5, Easing::Linear);
        assert!((result - 150.0).abs() < 1e-9);
    }

    #[test]
    fn parses_from_snake_case() {
        let e: Easing = serde_json::from_str("\"cubic_in_out\"").unwrap();
        assert_eq!(e, Easing::CubicInOut);
    }
}
