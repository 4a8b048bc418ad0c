//! Skeleton serializer - per-tick replication driver for one hand

use handsync_core::{BoneTopology, SyncError, SyncResult};

use crate::{
    ApplyOutcome, EncodeOutcome, PoseChannel, PoseDecoder, PoseEncoder, ReplicationView, Role,
    SerializerConfig, SkeletonRig, SkipReason, TrackingProvider,
};

/// Running counters of one serializer
#[derive(Clone, Debug, Default)]
pub struct SerializerStats {
    /// Calls to `tick`
    pub ticks: u64,
    /// Payloads written to the channel as authority
    pub published: u64,
    /// Visible payloads applied to the rig
    pub applied: u64,
    /// Hidden payloads applied to the rig
    pub hidden: u64,
    /// Inbound payloads ignored because of the role
    pub skipped: u64,
    /// Inbound payloads that failed to decode
    pub rejected: u64,
    /// Tracker samples that could not be encoded
    pub encode_errors: u64,
    /// Most recent encode or decode failure
    pub last_error: Option<SyncError>,
}

/// What one tick (or one inbound payload) did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not connected
    Offline,
    /// Authority step ran
    Encoded(EncodeOutcome),
    /// Observer step applied or skipped a payload
    Decoded(ApplyOutcome),
    /// Observer with no new payload
    Idle,
    /// Encode or decode failed; rig keeps its previous pose
    Failed(SyncError),
}

/// Replicates one hand skeleton.
///
/// Owns the rig it drives, its view of ownership, and (once assigned) the
/// channel and tracking provider. The role is re-derived on every call.
pub struct SkeletonSerializer<R, C, V> {
    topology: BoneTopology,
    encoder: PoseEncoder,
    decoder: PoseDecoder,
    rig: R,
    view: V,
    channel: Option<C>,
    provider: Option<Box<dyn TrackingProvider>>,
    stats: SerializerStats,
}

impl<R, C, V> SkeletonSerializer<R, C, V>
where
    R: SkeletonRig,
    C: PoseChannel,
    V: ReplicationView,
{
    /// Bind a serializer to `rig`. The rig must have one slot per topology
    /// bone; its root is reset.
    pub fn new(
        topology: BoneTopology,
        mut rig: R,
        view: V,
        config: SerializerConfig,
    ) -> SyncResult<Self> {
        if rig.bone_count() != topology.len() {
            return Err(SyncError::TopologyMismatch {
                expected: topology.len(),
                actual: rig.bone_count(),
            });
        }
        rig.reset_root();

        Ok(SkeletonSerializer {
            encoder: PoseEncoder::new(topology.clone(), config.clone()),
            decoder: PoseDecoder::new(topology.clone(), config),
            topology,
            rig,
            view,
            channel: None,
            provider: None,
            stats: SerializerStats::default(),
        })
    }

    /// Assign the tracker of a locally controlled hand
    pub fn assign_provider<P: TrackingProvider + 'static>(&mut self, provider: P) {
        self.provider = Some(Box::new(provider));
    }

    /// Attach a channel, returning the one it replaces.
    ///
    /// If the channel already carries a value, it is applied right away
    /// instead of waiting for the next change.
    pub fn attach_channel(&mut self, mut channel: C) -> Option<C> {
        let previous = self.channel.take();

        let current = if channel.is_fresh() {
            None
        } else {
            channel.take_changed().or_else(|| channel.current())
        };
        self.channel = Some(channel);

        if let Some(text) = current {
            self.receive(&text);
        }
        previous
    }

    /// Remove the channel; the serializer goes idle until another is attached
    pub fn detach_channel(&mut self) -> Option<C> {
        self.channel.take()
    }

    /// Run one update.
    ///
    /// The authority samples and publishes; an observer applies the latest
    /// channel value if it changed since the last tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        match Role::evaluate(&self.view) {
            Role::Offline => TickOutcome::Offline,
            Role::Authority => self.encode_step(),
            Role::Observer => {
                let changed = self.channel.as_mut().and_then(|c| c.take_changed());
                match changed {
                    Some(text) => self.receive(&text),
                    None => TickOutcome::Idle,
                }
            }
        }
    }

    fn encode_step(&mut self) -> TickOutcome {
        let Some(provider) = self.provider.as_mut() else {
            return TickOutcome::Encoded(EncodeOutcome::Skipped(SkipReason::NoProvider));
        };
        let Some(channel) = self.channel.as_mut() else {
            return TickOutcome::Encoded(EncodeOutcome::Skipped(SkipReason::NoChannel));
        };

        match self
            .encoder
            .encode(&self.view, &mut **provider, &mut self.rig, channel)
        {
            Ok(outcome) => {
                if matches!(outcome, EncodeOutcome::Published { .. }) {
                    self.stats.published += 1;
                }
                TickOutcome::Encoded(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, "pose sample not encoded");
                self.stats.encode_errors += 1;
                self.stats.last_error = Some(err.clone());
                TickOutcome::Failed(err)
            }
        }
    }

    /// Handle an inbound channel value
    pub fn receive(&mut self, payload: &str) -> TickOutcome {
        match self.decoder.apply(payload, &self.view, &mut self.rig) {
            Ok(outcome) => {
                match outcome {
                    ApplyOutcome::Skipped(reason) => {
                        tracing::debug!(?reason, "inbound pose skipped");
                        self.stats.skipped += 1;
                    }
                    ApplyOutcome::Hidden => self.stats.hidden += 1,
                    ApplyOutcome::Applied { .. } => self.stats.applied += 1,
                }
                TickOutcome::Decoded(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, bytes = payload.len(), "rejected pose payload");
                self.stats.rejected += 1;
                self.stats.last_error = Some(err.clone());
                TickOutcome::Failed(err)
            }
        }
    }

    pub fn role(&self) -> Role {
        Role::evaluate(&self.view)
    }

    pub fn topology(&self) -> &BoneTopology {
        &self.topology
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn channel(&self) -> Option<&C> {
        self.channel.as_ref()
    }

    pub fn channel_mut(&mut self) -> Option<&mut C> {
        self.channel.as_mut()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn stats(&self) -> &SerializerStats {
        &self.stats
    }
}
