/// Astronomical facts for the Sun, Earth and Moon.
///
/// Every length comes as a stylized/realistic pair. The stylized set keeps
/// all three bodies visible in one frame; the realistic set is in millions
/// of kilometres. Periods are in days.

use crate::core::config::{BodyConfig, InclinationMode, OrbitConfig, Scaled};

// ── Lengths ──────────────────────────────────────────────────────────

pub const ASTRONOMICAL_UNIT: Scaled = Scaled::new(30.0, 149.597887);
pub const MOON_DISTANCE: Scaled = Scaled::new(8.0, 0.384399);
pub const SUN_RADIUS: Scaled = Scaled::new(1.5, 0.696342);
pub const EARTH_RADIUS: Scaled = Scaled::new(1.0, 0.006371);
pub const MOON_RADIUS: Scaled = Scaled::new(0.2, 0.001737);

// ── Periods (days) ───────────────────────────────────────────────────

pub const SUN_ROTATION: f64 = 27.28;
pub const EARTH_ROTATION: f64 = 1.0;
pub const EARTH_REVOLUTION: f64 = 365.25696;
pub const MOON_ROTATION: f64 = 27.321582;
pub const MOON_REVOLUTION: f64 = MOON_ROTATION;

// ── Angles (degrees) ─────────────────────────────────────────────────

pub const EARTH_TILT: f64 = 23.44;
pub const MOON_TILT: f64 = 6.68;
pub const MOON_INCLINATION: f64 = 5.145;
/// Exaggerated inclination so the tilted orbit plane is obvious on screen.
pub const MOON_INCLINATION_EXAGGERATED: f64 = 20.0;
/// Texture alignment of the moon mesh.
pub const MOON_SPIN_OFFSET: f64 = -25.0;
/// Places Earth at its J2000 mean heliocentric longitude (100.46°).
pub const EARTH_ORBIT_OFFSET: f64 = 159.32;
/// Places the Moon at its J2000 mean geocentric longitude (218.32°).
pub const MOON_ORBIT_OFFSET: f64 = 129.13;

pub const SUN: &str = "sun";
pub const EARTH: &str = "earth";
pub const MOON: &str = "moon";

/// Sun, Earth and Moon, parents first.
pub fn default_bodies() -> Vec<BodyConfig> {
    vec![
        BodyConfig {
            name: SUN.to_string(),
            radius: SUN_RADIUS,
            spin_period: SUN_ROTATION,
            spin_offset: 0.0,
            axial_tilt: 0.0,
            tilted: false,
            orbit: None,
        },
        BodyConfig {
            name: EARTH.to_string(),
            radius: EARTH_RADIUS,
            spin_period: EARTH_ROTATION,
            spin_offset: 0.0,
            axial_tilt: EARTH_TILT,
            tilted: false,
            orbit: Some(OrbitConfig {
                parent: None,
                period: EARTH_REVOLUTION,
                offset: EARTH_ORBIT_OFFSET,
                distance: ASTRONOMICAL_UNIT,
                inclination: 0.0,
                inclination_exaggerated: 0.0,
                inclination_mode: InclinationMode::Flat,
            }),
        },
        BodyConfig {
            name: MOON.to_string(),
            radius: MOON_RADIUS,
            spin_period: MOON_ROTATION,
            spin_offset: MOON_SPIN_OFFSET,
            axial_tilt: MOON_TILT,
            tilted: true,
            orbit: Some(OrbitConfig {
                parent: Some(EARTH.to_string()),
                period: MOON_REVOLUTION,
                offset: MOON_ORBIT_OFFSET,
                distance: MOON_DISTANCE,
                inclination: MOON_INCLINATION,
                inclination_exaggerated: MOON_INCLINATION_EXAGGERATED,
                inclination_mode: InclinationMode::Flat,
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_declared_first() {
        let bodies = default_bodies();
        assert_eq!(bodies[0].name, SUN);
        let moon = bodies.iter().find(|b| b.name == MOON).unwrap();
        assert_eq!(moon.orbit.as_ref().unwrap().parent.as_deref(), Some(EARTH));
    }

    #[test]
    fn realistic_moon_fits_inside_stylized_gap() {
        // Sanity: realistic Earth-Moon distance is ~60 Earth radii.
        let ratio = MOON_DISTANCE.realistic / EARTH_RADIUS.realistic;
        assert!((ratio - 60.3).abs() < 0.5, "ratio = {ratio}");
    }
}
