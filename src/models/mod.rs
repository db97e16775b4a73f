//! Gompertz growth model.
//!
//! The model is a small, pure function so that fitting, interpolation and
//! scenario code can share one definition of the curve.

pub mod model;

pub use model::*;
