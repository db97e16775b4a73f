//! Intervention scenarios layered on the fitted baseline.

pub mod forecast;
pub mod intervention;

pub use forecast::*;
pub use intervention::*;
