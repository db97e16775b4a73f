//! Data-quality analysis of historical series.

pub mod analyzer;

pub use analyzer::*;
