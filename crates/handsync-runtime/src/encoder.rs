//! Pose encoder - authoritative side
//!
//! Samples the tracker, drives the local rig with the sampled rotations, and
//! writes the rig's resulting Euler angles into the outgoing payload in the
//! same pass.

use handsync_core::{BoneTopology, Quat, SyncError, SyncResult, TrackedPose};
use handsync_wire::{PayloadWriter, WirePayload};

use crate::{PoseChannel, ReplicationView, Role, SerializerConfig, SkeletonRig, TrackingProvider};

/// Why an encode or decode step did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not connected to the session
    Offline,
    /// Another participant drives this skeleton
    NotAuthoritative,
    /// This participant drives this skeleton
    Authoritative,
    /// No tracking provider assigned
    NoProvider,
    /// Inbound value was empty
    EmptyPayload,
    /// No channel attached
    NoChannel,
}

/// Result of one encoder step
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeOutcome {
    Skipped(SkipReason),
    Published { payload: WirePayload, visible: bool },
}

/// Encodes tracker samples for one bound topology
#[derive(Debug, Clone)]
pub struct PoseEncoder {
    topology: BoneTopology,
    config: SerializerConfig,
}

impl PoseEncoder {
    pub fn new(topology: BoneTopology, config: SerializerConfig) -> Self {
        Self { topology, config }
    }

    pub fn topology(&self) -> &BoneTopology {
        &self.topology
    }

    /// Turn a tracker sample into a payload, driving `rig` on the way.
    ///
    /// Low-confidence or invalid samples hide the rig and yield `0|`. A sample
    /// whose rotation count differs from the topology is rejected before the
    /// rig is touched.
    pub fn serialize<R: SkeletonRig + ?Sized>(
        &self,
        sample: &TrackedPose,
        rig: &mut R,
    ) -> SyncResult<WirePayload> {
        if !sample.is_transmittable(self.config.require_high_confidence) {
            rig.set_visible(false);
            return Ok(WirePayload::hidden());
        }

        if sample.rotations.len() != self.topology.len() {
            return Err(SyncError::TopologyMismatch {
                expected: self.topology.len(),
                actual: sample.rotations.len(),
            });
        }
        let finite =
            |q: &Quat| q.x.is_finite() && q.y.is_finite() && q.z.is_finite() && q.w.is_finite();
        if let Some(bone) = sample.rotations.iter().position(|q| !finite(q)) {
            return Err(SyncError::NonFiniteRotation { bone });
        }

        rig.set_visible(true);

        let mut writer = PayloadWriter::visible(self.config.wire.float_format, self.topology.len());
        for (bone, rotation) in sample.rotations.iter().enumerate() {
            let rotation = if self.config.flip_tracker_z {
                rotation.flip_z()
            } else {
                *rotation
            };
            rig.set_local_rotation(bone, rotation)?;
            writer.push_bone(rig.local_euler(bone)?)?;
        }

        Ok(writer.finish())
    }

    /// Sample, serialize and publish, if this participant is the authority.
    ///
    /// Observers and offline participants publish nothing, even when called
    /// directly.
    pub fn encode<V, P, R, C>(
        &self,
        view: &V,
        provider: &mut P,
        rig: &mut R,
        channel: &mut C,
    ) -> SyncResult<EncodeOutcome>
    where
        V: ReplicationView + ?Sized,
        P: TrackingProvider + ?Sized,
        R: SkeletonRig + ?Sized,
        C: PoseChannel + ?Sized,
    {
        match Role::evaluate(view) {
            Role::Offline => return Ok(EncodeOutcome::Skipped(SkipReason::Offline)),
            Role::Observer => return Ok(EncodeOutcome::Skipped(SkipReason::NotAuthoritative)),
            Role::Authority => {}
        }

        let sample = provider.pose_sample();
        let payload = self.serialize(&sample, rig)?;
        let visible = rig.is_visible();

        channel.publish(payload.as_str());
        tracing::trace!(bytes = payload.len(), visible, "published pose");

        Ok(EncodeOutcome::Published { payload, visible })
    }
}
