//! Validity flag - first field of every payload

use std::fmt;

/// Field separator, also written after the last field
pub const DELIMITER: char = '|';

/// Leading payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityFlag {
    /// `0`: no pose follows, hide the hand
    Hidden,
    /// `1`: one Euler triple per bone follows
    Visible,
}

impl ValidityFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidityFlag::Hidden => "0",
            ValidityFlag::Visible => "1",
        }
    }

    /// Parse a flag token; `None` for anything but `0` or `1`
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "0" => Some(ValidityFlag::Hidden),
            "1" => Some(ValidityFlag::Visible),
            _ => None,
        }
    }

    #[inline]
    pub fn is_visible(self) -> bool {
        self == ValidityFlag::Visible
    }
}

impl fmt::Display for ValidityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
