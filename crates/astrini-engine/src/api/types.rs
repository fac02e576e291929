use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Identifier of a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifier of a celestial body (its index in declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A camera anchor destination: a body, or the fixed overview point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Home,
    Body(BodyId),
}

impl Target {
    pub fn body(self) -> Option<BodyId> {
        match self {
            Target::Body(id) => Some(id),
            Target::Home => None,
        }
    }

    /// Wire code used by UI events: -1 = none, 0 = home, n = body n-1.
    pub fn to_code(target: Option<Target>) -> f32 {
        match target {
            None => -1.0,
            Some(Target::Home) => 0.0,
            Some(Target::Body(id)) => id.0 as f32 + 1.0,
        }
    }

    /// Inverse of [`Target::to_code`]. Codes below -0.5 mean "none".
    pub fn from_code(code: f32) -> Option<Target> {
        if !code.is_finite() || code < -0.5 {
            return None;
        }
        let code = code.round() as u32;
        if code == 0 {
            Some(Target::Home)
        } else {
            Some(Target::Body(BodyId(code - 1)))
        }
    }
}

/// A UI event communicated from Rust to the host page.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_codes_round_trip_for_known_values() {
        assert_eq!(Target::to_code(None), -1.0);
        assert_eq!(Target::from_code(-1.0), None);
        assert_eq!(Target::from_code(0.0), Some(Target::Home));
        assert_eq!(Target::from_code(3.0), Some(Target::Body(BodyId(2))));
        assert_eq!(Target::to_code(Some(Target::Body(BodyId(2)))), 3.0);
    }

    #[test]
    fn nan_code_means_none() {
        assert_eq!(Target::from_code(f32::NAN), None);
    }

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
    }
}
