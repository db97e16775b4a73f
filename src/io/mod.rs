//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - scenario parameter files (`scenario_config`)
//! - run JSON read/write (`bundle`)

pub mod bundle;
pub mod ingest;
pub mod scenario_config;

pub use bundle::*;
pub use ingest::*;
pub use scenario_config::*;
