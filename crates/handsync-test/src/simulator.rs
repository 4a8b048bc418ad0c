//! Replication scenario simulator
//!
//! Runs several participants replicating one hand over a shared register,
//! each behind its own lossy channel, and checks the replication invariants
//! after every tick:
//! - At most one participant publishes per tick, and only the authority
//! - Only observers apply payloads
//! - A rejected payload leaves the observer's pose and visibility untouched
//! - Once the channel calms down, every observer converges on the authority

use std::f64::consts::TAU;

use handsync_core::{BoneTopology, EulerAngles, Quat, SyncResult, TrackedPose};
use handsync_runtime::{
    ApplyOutcome, BoneRig, EncodeOutcome, Role, SerializerConfig, SharedRegister, SkeletonRig,
    SkeletonSerializer, TickOutcome, TrackingProvider,
};

use crate::authority::{AuthorityRegistry, AuthorityView};
use crate::chaos::{ChaosConfig, ChaosStats, LossyChannel};
use crate::id::NodeId;

/// Angular agreement required between authority and observers, in degrees
pub const POSE_TOLERANCE: f32 = 1e-2;

// ============================================================================
// SYNTHETIC TRACKER
// ============================================================================

/// Tracker that opens and closes the hand on a fixed period
#[derive(Debug, Clone)]
pub struct SyntheticHand {
    bones: usize,
    tick: u64,
    /// Ticks per open/close cycle
    period: u64,
    phase: f64,
    /// Every Nth sample is lost
    dropout_every: Option<u64>,
}

impl SyntheticHand {
    pub fn new(bones: usize) -> Self {
        Self {
            bones,
            tick: 0,
            period: 120,
            phase: 0.0,
            dropout_every: None,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period.max(1);
        self
    }

    pub fn with_dropout(mut self, every: u64) -> Self {
        self.dropout_every = Some(every);
        self
    }

    /// Rig-frame bone rotations at `tick`
    pub fn euler_at(&self, tick: u64) -> Vec<EulerAngles> {
        let base = TAU * (tick % self.period) as f64 / self.period as f64 + self.phase;
        (0..self.bones)
            .map(|bone| {
                let theta = base + 0.35 * bone as f64;
                EulerAngles::new(
                    (40.0 * (1.0 - theta.cos())) as f32,
                    (8.0 * theta.sin()) as f32,
                    2.0 * bone as f32,
                )
            })
            .collect()
    }

    fn is_dropout(&self, tick: u64) -> bool {
        self.dropout_every
            .is_some_and(|every| every > 0 && tick % every == every - 1)
    }
}

impl TrackingProvider for SyntheticHand {
    fn pose_sample(&mut self) -> TrackedPose {
        let tick = self.tick;
        self.tick += 1;

        if self.is_dropout(tick) {
            return TrackedPose::lost();
        }
        // Tracker reports in its own, Z-mirrored frame
        TrackedPose::confident(
            self.euler_at(tick)
                .into_iter()
                .map(|e| Quat::from_euler(e).flip_z())
                .collect(),
        )
    }
}

// ============================================================================
// SCENARIO HARNESS
// ============================================================================

pub type HandSerializer = SkeletonSerializer<BoneRig, LossyChannel, AuthorityView>;

/// Scenario configuration
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Number of participants; the first one starts as authority
    pub participants: usize,
    /// Bones in the replicated hand
    pub bones: usize,
    /// Ticks run with chaos enabled
    pub ticks: usize,
    /// Ticks run on a calm channel before convergence is checked
    pub settle_ticks: usize,
    /// Channel damage, if any
    pub chaos: Option<ChaosConfig>,
    /// Every Nth tracker sample is lost
    pub dropout_every: Option<u64>,
    /// Pass authority to the next participant every N ticks
    pub handover_every: Option<usize>,
    pub serializer: SerializerConfig,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            participants: 3,
            bones: 24,
            ticks: 300,
            settle_ticks: 3,
            chaos: None,
            dropout_every: Some(50),
            handover_every: None,
            serializer: SerializerConfig::default(),
            seed: 42,
        }
    }
}

impl ScenarioConfig {
    /// Minimal scenario configuration
    pub fn minimal() -> Self {
        Self {
            participants: 2,
            bones: 5,
            ticks: 30,
            settle_ticks: 2,
            dropout_every: None,
            ..Default::default()
        }
    }

    /// Standard scenario configuration
    pub fn standard() -> Self {
        Self::default()
    }

    /// Stress scenario configuration
    pub fn stress() -> Self {
        Self {
            participants: 4,
            ticks: 1000,
            settle_ticks: 5,
            chaos: Some(ChaosConfig::poor()),
            dropout_every: Some(37),
            handover_every: Some(150),
            ..Default::default()
        }
    }

    pub fn with_chaos(mut self, chaos: ChaosConfig) -> Self {
        self.chaos = Some(chaos);
        self
    }

    pub fn with_handover(mut self, every: usize) -> Self {
        self.handover_every = Some(every);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Result of a scenario run
#[derive(Debug, Clone, Default)]
pub struct ScenarioResult {
    pub ticks: usize,
    /// Payloads published by authorities
    pub published: u64,
    /// Visible payloads applied by observers
    pub applied: u64,
    /// Hidden payloads applied by observers
    pub hidden: u64,
    /// Payloads observers rejected
    pub rejected: u64,
    pub handovers: usize,
    /// Channel damage across all participants
    pub chaos: ChaosStats,
    /// Every observer matched the authority at the end
    pub converged: bool,
    pub violations: Vec<String>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.converged && self.violations.is_empty()
    }
}

/// One simulated participant
pub struct Participant {
    pub node: NodeId,
    serializer: HandSerializer,
}

impl Participant {
    pub fn role(&self) -> Role {
        self.serializer.role()
    }

    pub fn rig(&self) -> &BoneRig {
        self.serializer.rig()
    }

    pub fn serializer(&self) -> &HandSerializer {
        &self.serializer
    }
}

/// Several participants replicating one hand
pub struct HandSession {
    config: ScenarioConfig,
    topology: BoneTopology,
    registry: AuthorityRegistry,
    register: SharedRegister,
    participants: Vec<Participant>,
    tick: usize,
    handovers: usize,
    violations: Vec<String>,
}

impl HandSession {
    pub fn new(config: ScenarioConfig) -> SyncResult<Self> {
        let topology = BoneTopology::with_count(config.bones)?;
        let mut session = Self {
            config,
            topology,
            registry: AuthorityRegistry::new(),
            register: SharedRegister::new(),
            participants: Vec::new(),
            tick: 0,
            handovers: 0,
            violations: Vec::new(),
        };

        for _ in 0..session.config.participants {
            session.join()?;
        }
        if let Some(first) = session.participants.first() {
            session.registry.claim(first.node);
        }
        Ok(session)
    }

    /// Connect a new participant. Its channel is attached straight away, so
    /// it picks up whatever the register currently holds.
    pub fn join(&mut self) -> SyncResult<NodeId> {
        let index = self.participants.len();
        let node = NodeId::new(index as u64 + 1);
        self.registry.connect(node);

        let mut serializer = SkeletonSerializer::new(
            self.topology.clone(),
            BoneRig::new(&self.topology),
            self.registry.view(node),
            self.config.serializer.clone(),
        )?;

        let mut hand = SyntheticHand::new(self.topology.len()).with_phase(index as f64 * 0.5);
        if let Some(every) = self.config.dropout_every {
            hand = hand.with_dropout(every);
        }
        serializer.assign_provider(hand);

        let chaos = self.config.chaos.clone().unwrap_or_else(ChaosConfig::none);
        let seed = self.config.seed.wrapping_add(index as u64);
        serializer.attach_channel(LossyChannel::new(self.register.handle(), chaos, seed));

        self.participants.push(Participant { node, serializer });
        Ok(node)
    }

    /// Give authority to the participant after the current owner
    pub fn hand_over(&mut self) {
        if self.participants.is_empty() {
            return;
        }
        let current = self
            .registry
            .owner()
            .and_then(|owner| self.participants.iter().position(|p| p.node == owner));
        let next = current.map_or(0, |i| (i + 1) % self.participants.len());
        let node = self.participants[next].node;

        self.registry.claim(node);
        self.handovers += 1;
        tracing::debug!(tick = self.tick, %node, "authority handed over");
    }

    /// Run one tick for every participant, authority first
    pub fn step(&mut self) {
        if let Some(every) = self.config.handover_every {
            if every > 0 && self.tick > 0 && self.tick % every == 0 {
                self.hand_over();
            }
        }
        self.tick += 1;

        let owner = self.registry.owner();
        let mut order: Vec<usize> = (0..self.participants.len()).collect();
        order.sort_by_key(|&i| Some(self.participants[i].node) != owner);

        let mut publishers = 0;
        for i in order {
            let participant = &mut self.participants[i];
            let role = participant.serializer.role();
            let pose_before = participant.serializer.rig().pose();
            let visible_before = participant.serializer.rig().is_visible();

            let outcome = participant.serializer.tick();
            let node = participant.node;

            match &outcome {
                TickOutcome::Encoded(EncodeOutcome::Published { .. }) => {
                    publishers += 1;
                    if role != Role::Authority {
                        self.violations
                            .push(format!("tick {}: {} published as {:?}", self.tick, node, role));
                    }
                }
                TickOutcome::Decoded(ApplyOutcome::Applied { .. } | ApplyOutcome::Hidden)
                    if role != Role::Observer =>
                {
                    self.violations
                        .push(format!("tick {}: {} applied as {:?}", self.tick, node, role));
                }
                TickOutcome::Failed(err) if role == Role::Observer => {
                    let rig = participant.serializer.rig();
                    if rig.pose() != pose_before || rig.is_visible() != visible_before {
                        self.violations.push(format!(
                            "tick {}: {} changed pose on rejected payload ({})",
                            self.tick, node, err
                        ));
                    }
                }
                _ => {}
            }
        }

        if publishers > 1 {
            self.violations
                .push(format!("tick {}: {} participants published", self.tick, publishers));
        }
    }

    /// Run the chaos ticks, calm every channel, settle, then check convergence
    pub fn run(&mut self) -> ScenarioResult {
        for _ in 0..self.config.ticks {
            self.step();
        }

        for participant in &mut self.participants {
            if let Some(channel) = participant.serializer.channel_mut() {
                channel.calm();
            }
        }
        for _ in 0..self.config.settle_ticks {
            self.step();
        }

        let converged = self.check_convergence();
        self.result(converged)
    }

    /// Every observer shows the authority's visibility and, when visible,
    /// its pose
    pub fn check_convergence(&self) -> bool {
        let Some(authority) = self.authority() else {
            return true;
        };
        let reference = authority.rig();
        let pose = reference.pose();

        self.participants
            .iter()
            .filter(|p| p.node != authority.node)
            .all(|p| {
                let rig = p.rig();
                rig.is_visible() == reference.is_visible()
                    && (!reference.is_visible()
                        || pose
                            .iter()
                            .zip(rig.pose())
                            .all(|(a, b)| a.approx_eq(&b, POSE_TOLERANCE)))
            })
    }

    fn result(&self, converged: bool) -> ScenarioResult {
        let mut result = ScenarioResult {
            ticks: self.tick,
            handovers: self.handovers,
            converged,
            violations: self.violations.clone(),
            ..Default::default()
        };

        for participant in &self.participants {
            let stats = participant.serializer.stats();
            result.published += stats.published;
            result.applied += stats.applied;
            result.hidden += stats.hidden;
            result.rejected += stats.rejected;

            if let Some(channel) = participant.serializer.channel() {
                let chaos = channel.stats();
                result.chaos.published += chaos.published;
                result.chaos.delivered += chaos.delivered;
                result.chaos.dropped += chaos.dropped;
                result.chaos.truncated += chaos.truncated;
                result.chaos.corrupted += chaos.corrupted;
                result.chaos.reordered += chaos.reordered;
                result.chaos.duplicated += chaos.duplicated;
            }
        }
        result
    }

    pub fn authority(&self) -> Option<&Participant> {
        let owner = self.registry.owner()?;
        self.participants.iter().find(|p| p.node == owner)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn registry(&self) -> &AuthorityRegistry {
        &self.registry
    }

    pub fn topology(&self) -> &BoneTopology {
        &self.topology
    }

    pub fn tick(&self) -> usize {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_synthetic_hand_dropout() {
        let mut hand = SyntheticHand::new(3).with_dropout(4);
        let valid: Vec<bool> = (0..8).map(|_| hand.pose_sample().valid).collect();
        assert_eq!(valid, [true, true, true, false, true, true, true, false]);
    }

    #[test]
    fn test_synthetic_hand_is_periodic() {
        let hand = SyntheticHand::new(2).with_period(10);
        assert_eq!(hand.euler_at(3), hand.euler_at(13));
        assert_ne!(hand.euler_at(3), hand.euler_at(4));
    }

    #[test]
    fn test_minimal_session() {
        let mut session = HandSession::new(ScenarioConfig::minimal()).unwrap();
        let result = session.run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.rejected, 0);
        assert_eq!(result.published, 32);
        assert_eq!(result.applied, 32);
    }

    #[test]
    fn test_tracking_loss_hides_observers() {
        let mut session = HandSession::new(ScenarioConfig::standard()).unwrap();
        let result = session.run();

        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.hidden > 0);
    }

    #[test]
    fn test_hostile_channel_never_moves_rejected() {
        let config = ScenarioConfig {
            ticks: 200,
            ..ScenarioConfig::minimal()
        }
        .with_chaos(ChaosConfig::hostile());
        let mut session = HandSession::new(config).unwrap();
        let result = session.run();

        println!("Hostile result: {:?}", result);
        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.rejected > 0);
        assert!(result.chaos.dropped > 0);
    }

    #[test]
    fn test_handover_keeps_one_publisher() {
        let config = ScenarioConfig::minimal().with_handover(7);
        let mut session = HandSession::new(config).unwrap();
        let result = session.run();

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.handovers, 4);
        // Every participant drove the hand at some point
        for participant in session.participants() {
            assert!(participant.serializer().stats().published > 0);
        }
    }

    #[test]
    fn test_late_joiner_catches_up() {
        let mut session = HandSession::new(ScenarioConfig::minimal()).unwrap();
        for _ in 0..5 {
            session.step();
        }

        let node = session.join().unwrap();
        let joiner = session
            .participants()
            .iter()
            .find(|p| p.node == node)
            .unwrap();
        assert_eq!(joiner.role(), Role::Observer);
        assert!(joiner.rig().is_visible());
        assert!(session.check_convergence());
    }

    #[test]
    fn test_disconnected_participant_goes_quiet() {
        let mut session = HandSession::new(ScenarioConfig::minimal()).unwrap();
        session.step();
        let observer = session.participants()[1].node;
        session.registry().disconnect(observer);

        let before = session.participants()[1].rig().pose();
        for _ in 0..5 {
            session.step();
        }
        assert_eq!(session.participants()[1].role(), Role::Offline);
        assert_eq!(session.participants()[1].rig().pose(), before);
    }

    #[test]
    fn test_stress_session() {
        let mut session = HandSession::new(ScenarioConfig::stress()).unwrap();
        let result = session.run();

        println!("Stress result: {:?}", result);
        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.handovers > 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn poor_network_always_converges(seed in any::<u64>()) {
            let config = ScenarioConfig {
                ticks: 60,
                ..ScenarioConfig::minimal()
            }
            .with_chaos(ChaosConfig::poor())
            .with_seed(seed);
            let mut session = HandSession::new(config).unwrap();
            let result = session.run();
            prop_assert!(result.passed(), "{:?}", result.violations);
        }
    }
}
