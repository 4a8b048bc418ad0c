//! Pose samples - one snapshot of a hand, as tracked and as transmitted

use crate::{BoneTopology, EulerAngles, Quat, SyncError, SyncResult};

/// Raw sample from a tracking provider
#[derive(Debug, Clone, Default)]
pub struct TrackedPose {
    /// Tracker produced a pose this frame
    pub valid: bool,
    /// Tracker is confident in the pose
    pub high_confidence: bool,
    /// Per-bone rotations in the tracker frame, topology order
    pub rotations: Vec<Quat>,
}

impl TrackedPose {
    pub fn confident(rotations: Vec<Quat>) -> Self {
        Self {
            valid: true,
            high_confidence: true,
            rotations,
        }
    }

    pub fn lost() -> Self {
        Self::default()
    }

    /// Whether this sample may be transmitted
    pub fn is_transmittable(&self, require_high_confidence: bool) -> bool {
        self.valid && (self.high_confidence || !require_high_confidence)
    }
}

/// Pose as carried on the wire: a validity flag and, when valid, one Euler
/// triple per bone in topology order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseSample {
    pub valid: bool,
    pub rotations: Vec<EulerAngles>,
}

impl PoseSample {
    pub fn valid(rotations: Vec<EulerAngles>) -> Self {
        Self {
            valid: true,
            rotations,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    /// A valid sample must carry exactly one rotation per bone
    pub fn check(&self, topology: &BoneTopology) -> SyncResult<()> {
        if self.valid && self.rotations.len() != topology.len() {
            return Err(SyncError::TopologyMismatch {
                expected: topology.len(),
                actual: self.rotations.len(),
            });
        }
        Ok(())
    }
}
