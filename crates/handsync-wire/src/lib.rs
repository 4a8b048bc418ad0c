//! HANDSYNC Wire Protocol - Delimited text payload format
//!
//! A payload is a validity flag followed by the bone rotations:
//! - `0|` : pose invalid, hand hidden
//! - `1|x0|y0|z0|x1|y1|z1|...|` : one Euler triple per bone, topology order
//!
//! Every field, including the last, is followed by the delimiter. Numbers use
//! a locale-invariant decimal form. There is no bone count on the wire; the
//! receiver's topology decides how many fields it reads.

pub mod config;
pub mod flags;
pub mod number;
pub mod payload;

pub use config::*;
pub use flags::*;
pub use number::*;
pub use payload::*;
