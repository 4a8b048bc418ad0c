//! HANDSYNC Test Harness - Lossy channels and replication scenarios
//!
//! This crate provides:
//! - A pose channel that drops, truncates, corrupts and reorders writes
//! - Synthetic hand trackers
//! - Node identity and a shared ownership registry
//! - A multi-participant scenario harness with invariant checks

pub mod authority;
pub mod chaos;
pub mod id;
pub mod simulator;

pub use authority::*;
pub use chaos::*;
pub use id::*;
pub use simulator::*;
