//! Series repair: filling gaps and correcting flagged points.

pub mod fill;

pub use fill::*;
