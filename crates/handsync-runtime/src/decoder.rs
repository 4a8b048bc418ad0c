//! Pose decoder - observer side
//!
//! Applies inbound payloads to the local rig. A payload that fails to decode
//! changes nothing: the rig keeps its last good pose and visibility.

use std::cell::Cell;

use handsync_core::{BoneTopology, SyncError, SyncResult};
use handsync_wire::{decode, surplus_fields, DecodedPose};

use crate::{ReplicationView, Role, SerializerConfig, SkeletonRig, SkipReason};

/// Result of applying one inbound payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Guard failed; nothing was read
    Skipped(SkipReason),
    /// Hand hidden, bones untouched
    Hidden,
    /// Every bone rotation replaced
    Applied { bones: usize },
}

/// Decodes payloads for one bound topology
#[derive(Debug, Clone)]
pub struct PoseDecoder {
    topology: BoneTopology,
    config: SerializerConfig,
    /// Surplus field count of the last visible payload
    last_surplus: Cell<usize>,
}

impl PoseDecoder {
    pub fn new(topology: BoneTopology, config: SerializerConfig) -> Self {
        Self {
            topology,
            config,
            last_surplus: Cell::new(0),
        }
    }

    pub fn topology(&self) -> &BoneTopology {
        &self.topology
    }

    /// Decode `payload` and apply it to `rig`, if this participant observes.
    ///
    /// Empty payloads, authoritative participants and offline participants
    /// are skipped silently. Malformed payloads return the error and leave
    /// `rig` as it was.
    pub fn apply<V, R>(&self, payload: &str, view: &V, rig: &mut R) -> SyncResult<ApplyOutcome>
    where
        V: ReplicationView + ?Sized,
        R: SkeletonRig + ?Sized,
    {
        if payload.is_empty() {
            return Ok(ApplyOutcome::Skipped(SkipReason::EmptyPayload));
        }
        match Role::evaluate(view) {
            Role::Offline => return Ok(ApplyOutcome::Skipped(SkipReason::Offline)),
            Role::Authority => return Ok(ApplyOutcome::Skipped(SkipReason::Authoritative)),
            Role::Observer => {}
        }
        if rig.bone_count() != self.topology.len() {
            return Err(SyncError::TopologyMismatch {
                expected: self.topology.len(),
                actual: rig.bone_count(),
            });
        }

        match decode(payload, &self.topology, &self.config.wire)? {
            DecodedPose::Hidden => {
                rig.set_visible(false);
                tracing::debug!("remote hand hidden");
                Ok(ApplyOutcome::Hidden)
            }
            DecodedPose::Visible(rotations) => {
                let surplus = surplus_fields(payload, &self.topology);
                if self.note_surplus(surplus) && surplus > 0 {
                    tracing::warn!(
                        surplus,
                        bones = self.topology.len(),
                        "payload carries more fields than the bound topology"
                    );
                } else if surplus > 0 {
                    tracing::debug!(surplus, "surplus payload fields ignored");
                }

                rig.set_visible(true);
                for (bone, euler) in rotations.iter().enumerate() {
                    rig.set_local_euler(bone, *euler)?;
                }
                Ok(ApplyOutcome::Applied {
                    bones: rotations.len(),
                })
            }
        }
    }

    /// Record the surplus of a visible payload; true if it differs from the
    /// previous one
    fn note_surplus(&self, surplus: usize) -> bool {
        self.last_surplus.replace(surplus) != surplus
    }
}
