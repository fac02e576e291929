/// SharedArrayBuffer layout.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Camera: 8 floats]
/// [Instances: max_instances × 8 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// TypeScript reads them from the header to compute offsets dynamically.

use crate::api::game::GameConfig;
use crate::api::types::GameEvent;
use crate::bridge::instance::{BodyInstance, CameraInstance};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_MAX_EVENTS: usize = 4;
pub const HEADER_EVENT_COUNT: usize = 5;
pub const HEADER_PROTOCOL_VERSION: usize = 6;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per body instance (wire format — never changes).
pub const INSTANCE_FLOATS: usize = BodyInstance::FLOATS;

/// Floats in the camera block (wire format — never changes).
pub const CAMERA_FLOATS: usize = CameraInstance::FLOATS;

/// Floats per game event: kind, a, b, c (wire format — never changes).
pub const EVENT_FLOATS: usize = GameEvent::FLOATS;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    pub max_events: usize,

    pub instance_data_floats: usize,
    pub event_data_floats: usize,

    /// Offset (in floats) where the camera block begins.
    pub camera_offset: usize,
    /// Offset (in floats) where instance data begins.
    pub instance_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_instances: usize, max_events: usize) -> Self {
        let instance_data_floats = max_instances * INSTANCE_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let camera_offset = HEADER_FLOATS;
        let instance_data_offset = camera_offset + CAMERA_FLOATS;
        let event_data_offset = instance_data_offset + instance_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;
        let buffer_total_bytes = buffer_total_floats * 4;

        Self {
            max_instances,
            max_events,
            instance_data_floats,
            event_data_floats,
            camera_offset,
            instance_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_instances, config.max_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_default_config_matches_expected_sizes() {
        let layout = ProtocolLayout::from_config(&GameConfig::default());
        assert_eq!(layout.max_instances, 64);
        assert_eq!(layout.max_events, 32);
        assert_eq!(layout.camera_offset, 16);
        assert_eq!(layout.instance_data_offset, 24);
        assert_eq!(layout.event_data_offset, 24 + 64 * 8);
        assert_eq!(layout.buffer_total_floats, 24 + 64 * 8 + 32 * 4);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(3, 5);
        assert_eq!(layout.instance_data_offset, layout.camera_offset + CAMERA_FLOATS);
        assert_eq!(
            layout.event_data_offset,
            layout.instance_data_offset + layout.instance_data_floats
        );
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + layout.event_data_floats);
    }

    #[test]
    fn header_fields_fit_in_header() {
        for field in [
            HEADER_LOCK,
            HEADER_FRAME_COUNTER,
            HEADER_MAX_INSTANCES,
            HEADER_INSTANCE_COUNT,
            HEADER_MAX_EVENTS,
            HEADER_EVENT_COUNT,
            HEADER_PROTOCOL_VERSION,
        ] {
            assert!(field < HEADER_FLOATS);
        }
    }
}
