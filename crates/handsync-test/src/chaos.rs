//! Chaos testing for pose channels
//!
//! Wraps a channel and damages what the authority publishes:
//! - Loss (random and burst)
//! - Truncation
//! - Field corruption
//! - Reordering (a stale payload lands after a fresh one)
//! - Duplication

use handsync_runtime::{PoseChannel, RegisterHandle};
use handsync_wire::DELIMITER;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Replacement text for a corrupted field; never a number or a flag
const CORRUPT_TOKEN: &str = "#";

/// Channel chaos configuration
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Write loss rate (0.0 - 1.0)
    pub loss_rate: f64,
    /// Burst loss probability
    pub burst_loss_prob: f64,
    /// Burst loss length range
    pub burst_length: (u32, u32),
    /// Probability a delivered payload is cut short
    pub truncate_prob: f64,
    /// Probability one field of a delivered payload is garbled
    pub corrupt_prob: f64,
    /// Probability the previous payload is written again after this one
    pub reorder_prob: f64,
    /// Duplicate probability
    pub duplicate_prob: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            loss_rate: 0.02,
            burst_loss_prob: 0.02,
            burst_length: (2, 4),
            truncate_prob: 0.02,
            corrupt_prob: 0.02,
            reorder_prob: 0.02,
            duplicate_prob: 0.02,
        }
    }
}

impl ChaosConfig {
    /// Perfect channel
    pub fn none() -> Self {
        ChaosConfig {
            loss_rate: 0.0,
            burst_loss_prob: 0.0,
            burst_length: (0, 0),
            truncate_prob: 0.0,
            corrupt_prob: 0.0,
            reorder_prob: 0.0,
            duplicate_prob: 0.0,
        }
    }

    /// Good network conditions
    pub fn good() -> Self {
        ChaosConfig {
            loss_rate: 0.001,
            burst_loss_prob: 0.001,
            burst_length: (1, 2),
            truncate_prob: 0.001,
            corrupt_prob: 0.001,
            reorder_prob: 0.005,
            duplicate_prob: 0.005,
        }
    }

    /// Poor network conditions
    pub fn poor() -> Self {
        ChaosConfig {
            loss_rate: 0.05,
            burst_loss_prob: 0.05,
            burst_length: (3, 8),
            truncate_prob: 0.05,
            corrupt_prob: 0.05,
            reorder_prob: 0.1,
            duplicate_prob: 0.05,
        }
    }

    /// Hostile network conditions
    pub fn hostile() -> Self {
        ChaosConfig {
            loss_rate: 0.15,
            burst_loss_prob: 0.1,
            burst_length: (5, 15),
            truncate_prob: 0.15,
            corrupt_prob: 0.15,
            reorder_prob: 0.2,
            duplicate_prob: 0.1,
        }
    }
}

/// Lossy channel statistics
#[derive(Clone, Debug, Default)]
pub struct ChaosStats {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub truncated: u64,
    pub corrupted: u64,
    pub reordered: u64,
    pub duplicated: u64,
}

impl ChaosStats {
    pub fn loss_rate(&self) -> f64 {
        if self.published == 0 {
            0.0
        } else {
            self.dropped as f64 / self.published as f64
        }
    }

    /// Writes that reached the channel damaged
    pub fn damaged(&self) -> u64 {
        self.truncated + self.corrupted
    }
}

/// Pose channel that damages outgoing writes.
///
/// Reads pass straight through to the wrapped channel. Corrupted payloads
/// never decode under the default wire config; truncated ones usually fail but
/// may still parse to a nearby pose.
pub struct LossyChannel<C = RegisterHandle> {
    inner: C,
    config: ChaosConfig,
    rng: StdRng,
    burst_remaining: u32,
    /// Last payload actually written, replayed on reorder
    last_written: Option<String>,
    stats: ChaosStats,
}

impl<C: PoseChannel> LossyChannel<C> {
    /// Create a lossy channel with seed
    pub fn new(inner: C, config: ChaosConfig, seed: u64) -> Self {
        LossyChannel {
            inner,
            config,
            rng: StdRng::seed_from_u64(seed),
            burst_remaining: 0,
            last_written: None,
            stats: ChaosStats::default(),
        }
    }

    /// Channel that never damages anything
    pub fn perfect(inner: C) -> Self {
        Self::new(inner, ChaosConfig::none(), 0)
    }

    /// Stop injecting faults from now on
    pub fn calm(&mut self) {
        self.config = ChaosConfig::none();
        self.burst_remaining = 0;
    }

    pub fn set_config(&mut self, config: ChaosConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &ChaosConfig {
        &self.config
    }

    pub fn stats(&self) -> &ChaosStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ChaosStats::default();
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn should_drop(&mut self) -> bool {
        if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
            return true;
        }

        if self.rng.gen::<f64>() < self.config.burst_loss_prob {
            let (min, max) = self.config.burst_length;
            self.burst_remaining = self.rng.gen_range(min..=max.max(min));
            return true;
        }

        self.rng.gen::<f64>() < self.config.loss_rate
    }

    fn truncate(&mut self, payload: &str) -> String {
        if payload.len() < 2 {
            return String::new();
        }
        let mut cut = self.rng.gen_range(1..payload.len());
        while !payload.is_char_boundary(cut) {
            cut -= 1;
        }
        payload[..cut].to_string()
    }

    fn corrupt(&mut self, payload: &str) -> String {
        let mut tokens: Vec<&str> = payload.split(DELIMITER).collect();
        // Prefer a numeric field; fall back to the flag for `0|`
        let fields: Vec<usize> = (1..tokens.len()).filter(|&i| !tokens[i].is_empty()).collect();
        let target = if fields.is_empty() {
            0
        } else {
            fields[self.rng.gen_range(0..fields.len())]
        };
        tokens[target] = CORRUPT_TOKEN;
        tokens.join(&DELIMITER.to_string())
    }

    fn write(&mut self, payload: &str) {
        self.inner.publish(payload);
        self.last_written = Some(payload.to_string());
        self.stats.delivered += 1;
    }
}

impl<C: PoseChannel> PoseChannel for LossyChannel<C> {
    fn publish(&mut self, payload: &str) {
        self.stats.published += 1;

        if self.should_drop() {
            self.stats.dropped += 1;
            tracing::trace!("chaos dropped payload");
            return;
        }

        let payload = if self.rng.gen::<f64>() < self.config.truncate_prob {
            self.stats.truncated += 1;
            self.truncate(payload)
        } else if self.rng.gen::<f64>() < self.config.corrupt_prob {
            self.stats.corrupted += 1;
            self.corrupt(payload)
        } else {
            payload.to_string()
        };

        let stale = self.last_written.clone();
        self.write(&payload);

        if let Some(stale) = stale {
            if stale != payload && self.rng.gen::<f64>() < self.config.reorder_prob {
                self.stats.reordered += 1;
                self.write(&stale);
            }
        }

        // Repeats whatever landed last, including a reordered stale value
        if self.rng.gen::<f64>() < self.config.duplicate_prob {
            if let Some(last) = self.last_written.clone() {
                self.stats.duplicated += 1;
                self.inner.publish(&last);
            }
        }
    }

    fn take_changed(&mut self) -> Option<String> {
        self.inner.take_changed()
    }

    fn current(&self) -> Option<String> {
        self.inner.current()
    }

    fn is_fresh(&self) -> bool {
        self.inner.is_fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsync_core::{BoneTopology, SyncError};
    use handsync_runtime::SharedRegister;
    use handsync_wire::{decode, WireConfig};

    const PAYLOAD: &str = "1|10.5|0|0|0|0|90.25|";

    #[test]
    fn test_perfect_channel_passes_through() {
        let register = SharedRegister::new();
        let mut channel = LossyChannel::perfect(register.handle());

        channel.publish(PAYLOAD);
        assert_eq!(register.value().as_deref(), Some(PAYLOAD));
        assert_eq!(channel.stats().delivered, 1);
        assert_eq!(channel.stats().dropped, 0);
    }

    #[test]
    fn test_hostile_channel_loses_writes() {
        let register = SharedRegister::new();
        let mut channel = LossyChannel::new(register.handle(), ChaosConfig::hostile(), 12345);

        for _ in 0..1000 {
            channel.publish(PAYLOAD);
        }

        let stats = channel.stats();
        println!("Hostile stats: {:?}", stats);
        assert_eq!(stats.published, 1000);
        assert!(stats.loss_rate() > 0.05);
        assert!(stats.damaged() > 0);
    }

    #[test]
    fn test_corruption_never_decodes() {
        let topology = BoneTopology::with_count(2).unwrap();
        let register = SharedRegister::new();
        let config = ChaosConfig {
            corrupt_prob: 1.0,
            ..ChaosConfig::none()
        };
        let mut channel = LossyChannel::new(register.handle(), config, 7);

        for payload in [PAYLOAD, "0|"] {
            channel.publish(payload);
            let written = register.value().unwrap();
            assert_ne!(written, payload);
            let result = decode(&written, &topology, &WireConfig::default());
            assert!(matches!(
                result,
                Err(SyncError::InvalidNumber { .. }) | Err(SyncError::UnknownFlag(_))
            ));
        }
    }

    #[test]
    fn test_truncation_shortens() {
        let register = SharedRegister::new();
        let config = ChaosConfig {
            truncate_prob: 1.0,
            ..ChaosConfig::none()
        };
        let mut channel = LossyChannel::new(register.handle(), config, 99);

        for _ in 0..50 {
            channel.publish(PAYLOAD);
            let written = register.value().unwrap();
            assert!(written.len() < PAYLOAD.len());
            assert!(PAYLOAD.starts_with(&written));
        }
    }

    #[test]
    fn test_reorder_leaves_stale_value() {
        let register = SharedRegister::new();
        let config = ChaosConfig {
            reorder_prob: 1.0,
            ..ChaosConfig::none()
        };
        let mut channel = LossyChannel::new(register.handle(), config, 3);

        channel.publish("1|1|1|1|");
        channel.publish("1|2|2|2|");
        assert_eq!(register.value().as_deref(), Some("1|1|1|1|"));
        assert_eq!(channel.stats().reordered, 1);
    }

    #[test]
    fn test_reorder_survives_duplicate() {
        let register = SharedRegister::new();
        let config = ChaosConfig {
            reorder_prob: 1.0,
            duplicate_prob: 1.0,
            ..ChaosConfig::none()
        };
        let mut channel = LossyChannel::new(register.handle(), config, 11);

        channel.publish("1|1|1|1|");
        channel.publish("1|2|2|2|");
        assert_eq!(register.value().as_deref(), Some("1|1|1|1|"));
        assert_eq!(channel.stats().reordered, 1);
        assert_eq!(channel.stats().duplicated, 2);
    }

    #[test]
    fn test_calm_stops_faults() {
        let register = SharedRegister::new();
        let mut channel = LossyChannel::new(register.handle(), ChaosConfig::hostile(), 1);
        channel.calm();

        channel.publish(PAYLOAD);
        assert_eq!(register.value().as_deref(), Some(PAYLOAD));
    }

    #[test]
    fn test_reads_pass_through() {
        let register = SharedRegister::new();
        let mut channel = LossyChannel::new(register.handle(), ChaosConfig::hostile(), 5);
        assert!(channel.is_fresh());

        register.write("0|");
        assert!(!channel.is_fresh());
        assert_eq!(channel.take_changed().as_deref(), Some("0|"));
        assert_eq!(channel.take_changed(), None);
        assert_eq!(channel.current().as_deref(), Some("0|"));
    }
}
