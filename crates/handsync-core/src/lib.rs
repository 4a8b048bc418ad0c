//! HANDSYNC Core - Fundamental types for hand pose replication
//!
//! This crate defines the types shared by the encoder and decoder sides:
//! - Rotation primitives (Quat, EulerAngles)
//! - Bone topology and skeleton binding
//! - Pose samples
//! - Protocol errors

pub mod error;
pub mod rotation;
pub mod sample;
pub mod topology;

pub use error::*;
pub use rotation::*;
pub use sample::*;
pub use topology::*;
