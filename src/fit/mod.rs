//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - enumerate the fixed coarse parameter grid (`grid`)
//! - evaluate each candidate and pick the best start (parallel, deterministic)
//! - refine it with bounded gradient descent (`refine`)
//! - report fit metrics (`fitter`)

pub mod fitter;
pub mod grid;
pub mod refine;

pub use fitter::*;
pub use grid::*;
pub use refine::*;
