//! Built-in and synthetic input data.

pub mod sample;

pub use sample::*;
