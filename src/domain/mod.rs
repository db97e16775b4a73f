//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observed series points and their classification (`ObservedPoint`)
//! - fit outputs (`GompertzParams`, `FitResult`)
//! - quality diagnostics (`QualityReport`)
//! - scenario configuration and forecast output (`ScenarioSet`, `ForecastBundle`)
//! - quarter label continuation for forecast periods (`periods`)

pub mod periods;
pub mod types;

pub use periods::*;
pub use types::*;
