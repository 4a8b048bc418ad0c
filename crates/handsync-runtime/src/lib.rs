//! HANDSYNC Runtime - Per-tick pose replication for a hand skeleton
//!
//! Each participant runs one `SkeletonSerializer` per replicated hand. Every
//! tick it re-derives its role from the replication view:
//! 1. Offline: nothing happens
//! 2. Authority: sample the tracker, drive the local rig, publish a payload
//! 3. Observer: take the latest channel value, decode it, apply it to the rig
//!
//! Encoding and decoding never run for the same rig in the same tick; the
//! role decides which one is live.

pub mod authority;
pub mod channel;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod provider;
pub mod rig;
pub mod serializer;

pub use authority::*;
pub use channel::*;
pub use config::*;
pub use decoder::*;
pub use encoder::*;
pub use provider::*;
pub use rig::*;
pub use serializer::*;
