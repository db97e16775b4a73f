//! Mathematical utilities shared by the quality, interpolation and fit code.

pub mod stats;

pub use stats::*;
