//! `gompertz-forecast` library crate.
//!
//! The binary (`gcast`) is a thin wrapper around this library so that:
//!
//! - the numerical core is testable without spawning processes
//! - the pipeline can be driven from other front-ends
//!
//! Data flow: ingest -> quality analysis -> repair -> fit -> scenario forecast.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod interp;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod quality;
pub mod report;
pub mod scenario;
