//! Command-line parsing for the Gompertz growth forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! command dispatch (`app`) and from the numerical code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::MissingPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gcast", version, about = "Gompertz growth fitting and intervention scenario forecasts")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score data quality (missing values, outliers, declines, sample size).
    Analyze(InputArgs),
    /// Repair gaps per policy and fit the growth curve.
    Fit(RunArgs),
    /// Fit the curve and project baseline + intervention scenarios.
    Forecast(RunArgs),
    /// Print the built-in 20-quarter sample dataset as CSV.
    Sample,
    /// Generate a noisy synthetic Gompertz series as CSV.
    Synth(SynthArgs),
}

/// Where the historical series comes from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// CSV file with `period,value` rows.
    #[arg(value_name = "CSV", required_unless_present = "sample", conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Use the built-in sample dataset instead of a CSV file.
    #[arg(long)]
    pub sample: bool,

    /// The CSV's first row is a header.
    #[arg(long)]
    pub has_header: bool,
}

/// Options shared by `fit` and `forecast`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// How to handle missing quarters before fitting.
    #[arg(long = "fill", value_enum, default_value_t = MissingPolicy::Linear)]
    pub missing_policy: MissingPolicy,

    /// Forecast horizon in quarters (default 12, or the scenario file's value).
    #[arg(long)]
    pub horizon: Option<usize>,

    /// 1-based quarter offset of the intervention launch (default 1, or the scenario file's value).
    #[arg(long)]
    pub launch: Option<usize>,

    /// Scenario parameter TOML file (falls back to $GOMPERTZ_SCENARIOS).
    #[arg(long, value_name = "TOML")]
    pub scenarios: Option<PathBuf>,

    /// Write the full run (fit, quality, forecast) as JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for synthetic data generation.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Number of quarters to generate.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub quarters: usize,

    /// Asymptotic capacity K.
    #[arg(long, default_value_t = 1_000_000.0)]
    pub k: f64,

    /// Growth rate b.
    #[arg(long, default_value_t = 0.25)]
    pub b: f64,

    /// Inflection quarter t0.
    #[arg(long, default_value_t = 8.0)]
    pub t0: f64,

    /// Multiplicative log-normal noise (standard deviation of the log).
    #[arg(long, default_value_t = 0.03)]
    pub noise: f64,

    /// Probability that a quarter (other than the first) is left missing.
    #[arg(long, default_value_t = 0.0)]
    pub missing_prob: f64,

    /// Label of the first quarter.
    #[arg(long, default_value = "2019Q1")]
    pub start: String,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
