//! Locale-invariant decimal text for rotation fields

use std::fmt::Write;

use handsync_core::{SyncError, SyncResult};

/// How rotation angles are written to the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatFormat {
    /// At most this many decimals, trailing zeros trimmed
    Decimals(u8),
    /// Shortest text that parses back to the same `f32`
    Shortest,
}

impl Default for FloatFormat {
    fn default() -> Self {
        FloatFormat::Decimals(4)
    }
}

impl FloatFormat {
    /// Largest difference a value may show after one write/parse cycle
    pub fn tolerance(self) -> f32 {
        match self {
            FloatFormat::Decimals(d) => 0.5 * 10f32.powi(-(d as i32)) + 1e-4,
            FloatFormat::Shortest => 0.0,
        }
    }

    /// Append `value` to `out`. Never emits an exponent, a thousands
    /// separator, or `-0`.
    pub fn write(self, value: f32, out: &mut String) {
        let start = out.len();
        // Writing to a String cannot fail
        let _ = match self {
            FloatFormat::Decimals(d) => write!(out, "{:.*}", d as usize, value),
            FloatFormat::Shortest => write!(out, "{}", value),
        };

        if matches!(self, FloatFormat::Decimals(d) if d > 0) {
            let trimmed = out[start..].trim_end_matches('0').trim_end_matches('.').len();
            out.truncate(start + trimmed);
        }

        if &out[start..] == "-0" {
            out.truncate(start);
            out.push('0');
        }
    }

    pub fn format(self, value: f32) -> String {
        let mut out = String::new();
        self.write(value, &mut out);
        out
    }
}

/// Parse one numeric field. `index` is the field's position in the payload
/// and only feeds the error.
pub fn parse_field(token: &str, index: usize) -> SyncResult<f32> {
    match token.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SyncError::InvalidNumber {
            index,
            token: token.to_string(),
        }),
    }
}
