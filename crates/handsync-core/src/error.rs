//! Error types for HANDSYNC protocol

use thiserror::Error;

/// Core HANDSYNC errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    // Payload errors
    #[error("Empty payload")]
    EmptyPayload,

    #[error("Payload has no validity flag")]
    MissingFlag,

    #[error("Unknown validity flag: {0:?}")]
    UnknownFlag(String),

    #[error("Too few payload fields: expected {expected}, got {actual}")]
    TokenCount { expected: usize, actual: usize },

    #[error("Invalid number at field {index}: {token:?}")]
    InvalidNumber { index: usize, token: String },

    #[error("Non-finite rotation for bone {bone}")]
    NonFiniteRotation { bone: usize },

    // Topology errors
    #[error("Topology mismatch: expected {expected} bones, got {actual}")]
    TopologyMismatch { expected: usize, actual: usize },

    #[error("Bone index {index} out of range for {len} bones")]
    BoneOutOfRange { index: usize, len: usize },

    #[error("Skin has no bones besides the root")]
    EmptyTopology,

    #[error("Root bone not found in skin: {0}")]
    RootNotFound(String),
}

impl SyncError {
    /// Errors that mean an inbound payload could not be trusted.
    ///
    /// A sender bound to a different skeleton surfaces here too, since the
    /// wire carries no bone count.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SyncError::EmptyPayload
                | SyncError::MissingFlag
                | SyncError::UnknownFlag(_)
                | SyncError::TokenCount { .. }
                | SyncError::InvalidNumber { .. }
        )
    }
}

/// Result type for HANDSYNC operations
pub type SyncResult<T> = Result<T, SyncError>;
