//! Byte-range math for ranged fragment fetches.
//!
//! Splits the remaining part of a fragment into fixed-size windows and
//! formats HTTP Range values for them.

mod range;

pub use range::{open_range, plan_windows, ByteWindow};
