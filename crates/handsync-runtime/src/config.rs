//! Serializer configuration

use handsync_wire::WireConfig;

/// Skeleton serializer configuration
#[derive(Clone, Debug)]
pub struct SerializerConfig {
    /// Wire format
    pub wire: WireConfig,
    /// Transmit only samples the tracker is confident in
    pub require_high_confidence: bool,
    /// Tracker rotations are right-handed and must be mirrored along Z
    pub flip_tracker_z: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        SerializerConfig {
            wire: WireConfig::default(),
            require_high_confidence: true,
            flip_tracker_z: true,
        }
    }
}

impl SerializerConfig {
    /// Configuration interoperable with peers using unbounded number text
    pub fn legacy() -> Self {
        SerializerConfig {
            wire: WireConfig::legacy(),
            ..Default::default()
        }
    }

    pub fn with_wire(mut self, wire: WireConfig) -> Self {
        self.wire = wire;
        self
    }
}
