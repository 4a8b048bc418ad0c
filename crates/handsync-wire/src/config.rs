//! Wire format configuration

use crate::FloatFormat;

/// What the decoder does with a flag other than `0` or `1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFlagPolicy {
    /// Fail the decode; pose and visibility stay as they were
    #[default]
    Reject,
    /// Treat the payload like `0|`
    Hide,
}

/// Wire format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConfig {
    /// Number text for outgoing rotation fields
    pub float_format: FloatFormat,
    /// Handling of unrecognized validity flags
    pub unknown_flag: UnknownFlagPolicy,
}

impl Default for WireConfig {
    fn default() -> Self {
        WireConfig {
            float_format: FloatFormat::Decimals(4),
            unknown_flag: UnknownFlagPolicy::Reject,
        }
    }
}

impl WireConfig {
    /// Unbounded shortest-form numbers, lenient flags; for peers that
    /// predate the fixed precision
    pub fn legacy() -> Self {
        WireConfig {
            float_format: FloatFormat::Shortest,
            unknown_flag: UnknownFlagPolicy::Hide,
        }
    }

    /// Two decimals, for constrained channels
    pub fn compact() -> Self {
        WireConfig {
            float_format: FloatFormat::Decimals(2),
            ..Default::default()
        }
    }
}
