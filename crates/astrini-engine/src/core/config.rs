// core/config.rs
//
// Simulation configuration. Loaded from JSON at runtime or built from the
// Astrini defaults. Body parameters are validated once here so nothing at
// frame rate has to guard against zero periods or negative lengths.

use std::collections::HashSet;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extensions::easing::{lerp, Easing};
use crate::sim::bodies;

/// Configuration or programmer error, reported at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no bodies configured")]
    NoBodies,
    #[error("duplicate body name `{0}`")]
    DuplicateName(String),
    #[error("body `{body}`: {quantity} must be finite and non-zero, got {value}")]
    BadPeriod { body: String, quantity: &'static str, value: f64 },
    #[error("body `{body}`: {quantity} must be finite and non-negative, got {value}")]
    BadLength { body: String, quantity: &'static str, value: f64 },
    #[error("body `{body}`: {quantity} must be finite, got {value}")]
    NonFinite { body: String, quantity: &'static str, value: f64 },
    #[error("body `{body}` orbits `{parent}`, which is unknown or declared after it")]
    UnknownParent { body: String, parent: String },
    #[error("invalid speed bounds: min {min}, max {max}, initial {initial}")]
    SpeedBounds { min: f64, max: f64, initial: f64 },
    #[error("{name} must be a finite, positive duration, got {value}")]
    BadDuration { name: &'static str, value: f64 },
    #[error("initial blend {0} is outside [0, 1]")]
    BadBlend(f64),
    #[error("camera field of view {0} must lie in (0, 180) degrees")]
    BadFov(f64),
    #[error("camera target `{0}` is not a body that can be used here")]
    UnknownTarget(String),
}

/// A length with a stylized and a realistic value, blended by the scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaled {
    pub stylized: f64,
    pub realistic: f64,
}

impl Scaled {
    pub const fn new(stylized: f64, realistic: f64) -> Self {
        Self { stylized, realistic }
    }

    /// Value at `blend` (0 = stylized, 1 = realistic). Blend is clamped.
    pub fn at(&self, blend: f64) -> f64 {
        let t = blend.clamp(0.0, 1.0);
        if t >= 1.0 {
            self.realistic
        } else {
            lerp(self.stylized, self.realistic, t)
        }
    }

    pub fn min(&self) -> f64 {
        self.stylized.min(self.realistic)
    }

    pub fn max(&self) -> f64 {
        self.stylized.max(self.realistic)
    }

    fn is_valid_length(&self) -> bool {
        self.stylized.is_finite()
            && self.realistic.is_finite()
            && self.stylized >= 0.0
            && self.realistic >= 0.0
    }
}

/// Which orbital plane a body uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclinationMode {
    #[default]
    Flat,
    Real,
    Exaggerated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    /// Name of the body orbited; `None` orbits the scene origin.
    #[serde(default)]
    pub parent: Option<String>,
    /// Days per revolution.
    pub period: f64,
    /// Phase correction in degrees.
    #[serde(default)]
    pub offset: f64,
    pub distance: Scaled,
    /// Real inclination of the orbital plane, degrees.
    #[serde(default)]
    pub inclination: f64,
    /// Exaggerated inclination, degrees.
    #[serde(default)]
    pub inclination_exaggerated: f64,
    #[serde(default)]
    pub inclination_mode: InclinationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    pub radius: Scaled,
    /// Days per full rotation.
    pub spin_period: f64,
    /// Texture alignment in degrees.
    #[serde(default)]
    pub spin_offset: f64,
    /// Axial tilt in degrees, applied while `tilted` is set.
    #[serde(default)]
    pub axial_tilt: f64,
    #[serde(default)]
    pub tilted: bool,
    #[serde(default)]
    pub orbit: Option<OrbitConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest |speed|, simulated seconds per real second.
    pub max_speed: f64,
    /// Smallest |speed|; also the "paused" crawl.
    pub min_speed: f64,
    pub initial_speed: f64,
    /// Real seconds a calendar jump takes.
    pub jump_secs: f64,
    pub jump_easing: Easing,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_speed: 70_000_000.0,
            min_speed: 0.001,
            initial_speed: 1.0,
            jump_secs: 1.0,
            jump_easing: Easing::SmoothStep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Real seconds to slow the clock down, and again to restore it.
    pub freeze_secs: f64,
    /// Real seconds an anchor spends travelling between targets.
    pub travel_secs: f64,
    pub speed_easing: Easing,
    pub travel_easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            freeze_secs: 0.2,
            travel_secs: 1.0,
            speed_easing: Easing::SmoothStep,
            travel_easing: Easing::SmoothStep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub transition_secs: f64,
    pub initial_blend: f64,
    pub easing: Easing,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            transition_secs: 2.0,
            initial_blend: 0.0,
            easing: Easing::SmoothStep,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f64,
    /// `"home"` or a body name.
    pub initial_follow: Option<String>,
    /// A body name.
    pub initial_look: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            initial_follow: Some(HOME.to_string()),
            initial_look: Some(bodies::SUN.to_string()),
        }
    }
}

/// Name reserved for the fixed overview anchor.
pub const HOME: &str = "home";

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub transitions: TransitionConfig,
    #[serde(default)]
    pub scale: ScaleConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "bodies::default_bodies")]
    pub bodies: Vec<BodyConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            transitions: TransitionConfig::default(),
            scale: ScaleConfig::default(),
            camera: CameraConfig::default(),
            bodies: bodies::default_bodies(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the frame loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.clock;
        let speeds_ok = c.min_speed.is_finite()
            && c.max_speed.is_finite()
            && c.initial_speed.is_finite()
            && c.min_speed > 0.0
            && c.max_speed >= c.min_speed
            && c.initial_speed.abs() <= c.max_speed;
        if !speeds_ok {
            return Err(ConfigError::SpeedBounds {
                min: c.min_speed,
                max: c.max_speed,
                initial: c.initial_speed,
            });
        }

        for (name, value) in [
            ("clock.jump_secs", c.jump_secs),
            ("transitions.freeze_secs", self.transitions.freeze_secs),
            ("transitions.travel_secs", self.transitions.travel_secs),
            ("scale.transition_secs", self.scale.transition_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::BadDuration { name, value });
            }
        }

        let blend = self.scale.initial_blend;
        if !(0.0..=1.0).contains(&blend) {
            return Err(ConfigError::BadBlend(blend));
        }
        let fov = self.camera.fov_deg;
        if !fov.is_finite() || fov <= 0.0 || fov >= 180.0 {
            return Err(ConfigError::BadFov(fov));
        }

        if self.bodies.is_empty() {
            return Err(ConfigError::NoBodies);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for body in &self.bodies {
            validate_body(body, &seen)?;
            if !seen.insert(body.name.as_str()) {
                return Err(ConfigError::DuplicateName(body.name.clone()));
            }
        }

        if let Some(name) = &self.camera.initial_follow {
            if name != HOME && !seen.contains(name.as_str()) {
                return Err(ConfigError::UnknownTarget(name.clone()));
            }
        }
        if let Some(name) = &self.camera.initial_look {
            if !seen.contains(name.as_str()) {
                return Err(ConfigError::UnknownTarget(name.clone()));
            }
        }
        Ok(())
    }

    /// Fixed overview point: far enough back along -Y that the widest
    /// top-level orbit (plus a third of it as margin) fills the field of view.
    pub fn home_position(&self) -> DVec3 {
        let ua = self
            .bodies
            .iter()
            .filter_map(|b| b.orbit.as_ref())
            .filter(|o| o.parent.is_none())
            .map(|o| o.distance.stylized)
            .fold(0.0_f64, f64::max);
        let ua = if ua > 0.0 { ua } else { 1.0 };
        let margin = ua / 3.0;
        let half_fov = (self.camera.fov_deg / 2.0).to_radians();
        DVec3::new(0.0, -(ua + margin) / half_fov.tan(), ua / 3.0)
    }
}

fn validate_body(body: &BodyConfig, declared: &HashSet<&str>) -> Result<(), ConfigError> {
    let name = || body.name.clone();
    if body.name == HOME {
        return Err(ConfigError::DuplicateName(name()));
    }
    if !body.radius.is_valid_length() {
        return Err(ConfigError::BadLength {
            body: name(),
            quantity: "radius",
            value: if body.radius.stylized.is_finite() && body.radius.stylized >= 0.0 {
                body.radius.realistic
            } else {
                body.radius.stylized
            },
        });
    }
    check_period(&body.name, "spin_period", body.spin_period)?;
    for (quantity, value) in [("spin_offset", body.spin_offset), ("axial_tilt", body.axial_tilt)] {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { body: name(), quantity, value });
        }
    }

    if let Some(orbit) = &body.orbit {
        check_period(&body.name, "orbit period", orbit.period)?;
        if !orbit.distance.is_valid_length() {
            return Err(ConfigError::BadLength {
                body: name(),
                quantity: "distance",
                value: orbit.distance.min(),
            });
        }
        for (quantity, value) in [
            ("orbit offset", orbit.offset),
            ("inclination", orbit.inclination),
            ("inclination_exaggerated", orbit.inclination_exaggerated),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { body: name(), quantity, value });
            }
        }
        if let Some(parent) = &orbit.parent {
            if !declared.contains(parent.as_str()) {
                return Err(ConfigError::UnknownParent {
                    body: name(),
                    parent: parent.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_period(body: &str, quantity: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value == 0.0 {
        return Err(ConfigError::BadPeriod {
            body: body.to_string(),
            quantity,
            value,
        });
    }
    Ok(())
}
