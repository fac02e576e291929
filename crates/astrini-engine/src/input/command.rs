// input/command.rs
//
// Everything a user can ask the simulation to do, decoded from UI custom
// events. Key bindings are the application's business and map onto these
// same commands.

use crate::api::types::Target;

/// Custom event kinds understood by [`Command::from_custom`].
pub mod kind {
    pub const FOLLOW: u32 = 1;
    pub const LOOK: u32 = 2;
    pub const CHANGE_SPEED: u32 = 3;
    pub const SET_SPEED: u32 = 4;
    pub const TOGGLE_PAUSE: u32 = 5;
    pub const REVERSE: u32 = 6;
    pub const JUMP_TIME: u32 = 7;
    pub const SET_TIME_NOW: u32 = 8;
    pub const TOGGLE_SCALE: u32 = 9;
    pub const TOGGLE_EARTH_TILT: u32 = 10;
    pub const TOGGLE_MOON_INCLINATION: u32 = 11;
    pub const TOGGLE_SHADOWS: u32 = 12;
    pub const TOGGLE_MARKERS: u32 = 13;
    pub const TOGGLE_ORBITS: u32 = 14;
    pub const TOGGLE_STARS: u32 = 15;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move the camera onto a target; `None` stops following.
    Follow(Option<Target>),
    /// Focus the camera on a target; `None` stops looking.
    Look(Option<Target>),
    /// Multiply the speed of time.
    ChangeSpeed(f64),
    /// Set the speed of time, simulated seconds per real second.
    SetSpeed(f64),
    TogglePause,
    Reverse,
    /// Smoothly jump the calendar by a number of days.
    JumpTime(f64),
    /// Back to the present at real-time speed.
    SetTimeNow,
    ToggleScale,
    ToggleEarthTilt,
    /// Real inclination, or exaggerated with `hard`.
    ToggleMoonInclination { hard: bool },
    ToggleShadows,
    ToggleMarkers,
    ToggleOrbits,
    ToggleStars,
}

impl Command {
    /// Decode a UI custom event. Target arguments use [`Target::from_code`].
    pub fn from_custom(kind: u32, a: f32, _b: f32, _c: f32) -> Option<Command> {
        let command = match kind {
            kind::FOLLOW => Command::Follow(Target::from_code(a)),
            kind::LOOK => Command::Look(Target::from_code(a)),
            kind::CHANGE_SPEED => Command::ChangeSpeed(a as f64),
            kind::SET_SPEED => Command::SetSpeed(a as f64),
            kind::TOGGLE_PAUSE => Command::TogglePause,
            kind::REVERSE => Command::Reverse,
            kind::JUMP_TIME => Command::JumpTime(a as f64),
            kind::SET_TIME_NOW => Command::SetTimeNow,
            kind::TOGGLE_SCALE => Command::ToggleScale,
            kind::TOGGLE_EARTH_TILT => Command::ToggleEarthTilt,
            kind::TOGGLE_MOON_INCLINATION => Command::ToggleMoonInclination { hard: a != 0.0 },
            kind::TOGGLE_SHADOWS => Command::ToggleShadows,
            kind::TOGGLE_MARKERS => Command::ToggleMarkers,
            kind::TOGGLE_ORBITS => Command::ToggleOrbits,
            kind::TOGGLE_STARS => Command::ToggleStars,
            _ => {
                log::debug!("input: unknown custom event kind {}", kind);
                return None;
            }
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BodyId;

    #[test]
    fn decodes_targets() {
        assert_eq!(
            Command::from_custom(kind::FOLLOW, 2.0, 0.0, 0.0),
            Some(Command::Follow(Some(Target::Body(BodyId(1)))))
        );
        assert_eq!(Command::from_custom(kind::LOOK, -1.0, 0.0, 0.0), Some(Command::Look(None)));
        assert_eq!(
            Command::from_custom(kind::FOLLOW, 0.0, 0.0, 0.0),
            Some(Command::Follow(Some(Target::Home)))
        );
    }

    #[test]
    fn decodes_arguments() {
        assert_eq!(
            Command::from_custom(kind::JUMP_TIME, -7.0, 0.0, 0.0),
            Some(Command::JumpTime(-7.0))
        );
        assert_eq!(
            Command::from_custom(kind::TOGGLE_MOON_INCLINATION, 1.0, 0.0, 0.0),
            Some(Command::ToggleMoonInclination { hard: true })
        );
    }

    #[test]
    fn every_kind_decodes_and_unknown_is_none() {
        for k in 1..=15 {
            assert!(Command::from_custom(k, 1.0, 0.0, 0.0).is_some(), "kind {k}");
        }
        assert_eq!(Command::from_custom(0, 0.0, 0.0, 0.0), None);
        assert_eq!(Command::from_custom(16, 0.0, 0.0, 0.0), None);
    }
}
