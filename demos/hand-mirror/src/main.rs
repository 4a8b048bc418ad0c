//! Hand mirror demo
//!
//! A local participant tracks a synthetic hand and publishes it; a remote
//! participant mirrors it over a lossy channel. Halfway through, a third
//! participant joins and catches up from the channel's current value. Every
//! participant uses the two-decimal wire format.
//!
//! Run with `RUST_LOG=debug` to see every skipped and rejected payload.

use handsync_core::{BoneTopology, SkinDescriptor, SyncResult};
use handsync_runtime::{
    BoneRig, SerializerConfig, SharedRegister, SkeletonRig, SkeletonSerializer, TickOutcome,
};
use handsync_test::{
    AuthorityRegistry, ChaosConfig, HandSerializer, LossyChannel, NodeId, SyntheticHand,
};
use handsync_wire::WireConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ROOT_BONE: &str = "Hand_WristRoot";

const HAND_BONES: &[&str] = &[
    "Hand_WristRoot",
    "Hand_ForearmStub",
    "Hand_Thumb0",
    "Hand_Thumb1",
    "Hand_Thumb2",
    "Hand_Thumb3",
    "Hand_Index1",
    "Hand_Index2",
    "Hand_Index3",
    "Hand_Middle1",
    "Hand_Middle2",
    "Hand_Middle3",
    "Hand_Ring1",
    "Hand_Ring2",
    "Hand_Ring3",
    "Hand_Pinky0",
    "Hand_Pinky1",
    "Hand_Pinky2",
    "Hand_Pinky3",
    "Hand_ThumbTip",
    "Hand_IndexTip",
    "Hand_MiddleTip",
    "Hand_RingTip",
    "Hand_PinkyTip",
];

const TICKS: usize = 240;

fn participant(
    topology: &BoneTopology,
    registry: &AuthorityRegistry,
    register: &SharedRegister,
    node: NodeId,
    chaos: ChaosConfig,
) -> SyncResult<HandSerializer> {
    registry.connect(node);
    let mut serializer = SkeletonSerializer::new(
        topology.clone(),
        BoneRig::new(topology),
        registry.view(node),
        SerializerConfig::default().with_wire(WireConfig::compact()),
    )?;
    serializer.attach_channel(LossyChannel::new(register.handle(), chaos, node.0));
    Ok(serializer)
}

fn main() -> SyncResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let topology = BoneTopology::bind(&SkinDescriptor::new(Some(ROOT_BONE), HAND_BONES))?;
    info!(bones = topology.len(), "bound hand skeleton");

    let registry = AuthorityRegistry::new();
    let register = SharedRegister::new();
    let local_node = NodeId::new(1);
    let remote_node = NodeId::new(2);

    let mut local = participant(&topology, &registry, &register, local_node, ChaosConfig::poor())?;
    let mut remote = participant(&topology, &registry, &register, remote_node, ChaosConfig::none())?;
    registry.claim(local_node);
    local.assign_provider(SyntheticHand::new(topology.len()).with_dropout(60));

    let index = topology.index_of("Hand_Index1").unwrap_or(0);
    let mut late: Option<HandSerializer> = None;

    for tick in 0..TICKS {
        local.tick();
        let outcome = remote.tick();
        if let Some(observer) = late.as_mut() {
            observer.tick();
        }

        if let TickOutcome::Failed(err) = &outcome {
            info!(tick, error = %err, "remote kept its last pose");
        }

        if tick % 30 == 0 {
            let rig = remote.rig();
            info!(
                tick,
                visible = rig.is_visible(),
                index_curl = rig.local_euler(index)?.x,
                "remote hand"
            );
        }

        if tick == TICKS / 2 {
            let node = NodeId::new(3);
            let observer = participant(&topology, &registry, &register, node, ChaosConfig::none())?;
            info!(
                %node,
                visible = observer.rig().is_visible(),
                index_curl = observer.rig().local_euler(index)?.x,
                "late participant caught up on join"
            );
            late = Some(observer);
        }
    }

    let chaos = local
        .detach_channel()
        .map(|channel| channel.stats().clone())
        .unwrap_or_default();
    info!(
        published = local.stats().published,
        dropped = chaos.dropped,
        damaged = chaos.damaged(),
        applied = remote.stats().applied,
        hidden = remote.stats().hidden,
        rejected = remote.stats().rejected,
        "done"
    );
    Ok(())
}
