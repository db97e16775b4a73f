//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments and scenario files
//! - runs the analyze/fit/forecast pipeline
//! - prints reports and writes optional exports

use std::io;

use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, Command, InputArgs, RunArgs, SynthArgs};
use crate::data::{SyntheticSpec, generate_synthetic, sample_points};
use crate::domain::{ForecastConfig, ObservedPoint};
use crate::error::AppError;
use crate::io::{
    IngestOptions, RunFile, ScenarioFile, load_series, resolve_scenario_path, validate_config,
    write_run_json,
};
use crate::report::{compute_residuals, format_fit, format_quality, format_run_summary};

pub mod pipeline;

use pipeline::{Session, run_pipeline};

/// Entry point for the `gcast` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    crate::logging::init_cli_logger(cli.verbose);

    match cli.command {
        Command::Analyze(args) => handle_analyze(&args),
        Command::Fit(args) => handle_run(&args, OutputMode::FitOnly),
        Command::Forecast(args) => handle_run(&args, OutputMode::Full),
        Command::Sample => write_series_csv(&sample_points()),
        Command::Synth(args) => handle_synth(&args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    FitOnly,
}

fn handle_analyze(args: &InputArgs) -> Result<(), AppError> {
    let mut session = Session::new(load_input(args)?);
    let report = session.analyze();
    println!("{}", format_quality(report));

    let outliers = session.outlier_indices();
    if !outliers.is_empty() {
        let labels: Vec<&str> = outliers
            .iter()
            .map(|&i| session.series[i].period_label.as_str())
            .collect();
        println!("Flagged quarters: {}", labels.join(", "));
    }
    Ok(())
}

fn handle_run(args: &RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = forecast_config_from_args(args)?;
    let mut session = Session::new(load_input(&args.input)?);
    let output = run_pipeline(&mut session, &config)?;
    let residuals = compute_residuals(&session.series, &output.fit);

    match mode {
        OutputMode::Full => println!("{}", format_run_summary(&output, &residuals, &config)),
        OutputMode::FitOnly => {
            println!("{}", format_quality(&output.quality));
            println!("{}", format_fit(&output.fit, &residuals));
        }
    }

    if let Some(path) = &args.export_json {
        let run = RunFile::new(
            session.series.len(),
            &config,
            output.quality,
            output.fit,
            output.forecast,
        );
        write_run_json(path, &run)?;
        debug!(path = %path.display(), "run exported");
    }
    Ok(())
}

fn handle_synth(args: &SynthArgs) -> Result<(), AppError> {
    let spec = SyntheticSpec {
        k: args.k,
        b: args.b,
        t0: args.t0,
        quarters: args.quarters,
        noise: args.noise,
        missing_prob: args.missing_prob,
        start_label: args.start.clone(),
    };
    write_series_csv(&generate_synthetic(&spec, args.seed)?)
}

/// Build the forecast configuration: defaults, then the scenario file, then CLI flags.
pub fn forecast_config_from_args(args: &RunArgs) -> Result<ForecastConfig, AppError> {
    let mut config = ForecastConfig {
        missing_policy: args.missing_policy,
        ..Default::default()
    };

    if let Some(path) = resolve_scenario_path(args.scenarios.as_deref()) {
        ScenarioFile::from_file(&path)?.apply(&mut config);
    }
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(launch) = args.launch {
        config.launch_quarter = launch;
    }

    validate_config(&config)?;
    Ok(config)
}

fn load_input(args: &InputArgs) -> Result<Vec<ObservedPoint>, AppError> {
    if args.sample {
        return Ok(sample_points());
    }
    let path = args
        .input
        .as_deref()
        .ok_or_else(|| AppError::input("No input: pass a CSV path or --sample."))?;
    load_series(path, IngestOptions { has_header: args.has_header })
}

/// Write `period,value` rows to stdout; missing values become empty fields.
fn write_series_csv(series: &[ObservedPoint]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for p in series {
        let value = p.valid_value().map(|v| format!("{v:.2}")).unwrap_or_default();
        writer
            .write_record([p.period_label.as_str(), value.as_str()])
            .map_err(|e| AppError::input(format!("Failed to write CSV: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to write CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::MissingPolicy;

    fn run_args() -> RunArgs {
        RunArgs {
            input: InputArgs {
                input: None,
                sample: true,
                has_header: false,
            },
            missing_policy: MissingPolicy::Forward,
            horizon: None,
            launch: None,
            scenarios: None,
            export_json: None,
        }
    }

    #[test]
    fn cli_flags_override_scenario_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.toml");
        std::fs::write(&path, "horizon = 20\nlaunch_quarter = 4\n[conservative]\nkappa = 0.07\n").unwrap();

        let mut args = run_args();
        args.scenarios = Some(path);
        args.launch = Some(2);

        let config = forecast_config_from_args(&args).unwrap();
        assert_eq!(config.horizon, 20);
        assert_eq!(config.launch_quarter, 2);
        assert_eq!(config.scenarios.conservative.kappa, 0.07);
        assert_eq!(config.missing_policy, MissingPolicy::Forward);
    }

    #[test]
    fn invalid_flags_are_input_errors() {
        let mut args = run_args();
        args.scenarios = Some(PathBuf::from("/nonexistent/scenarios.toml"));
        assert_eq!(forecast_config_from_args(&args).unwrap_err().exit_code(), 2);

        let mut args = run_args();
        args.horizon = Some(0);
        assert_eq!(forecast_config_from_args(&args).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn sample_input_needs_no_file() {
        let series = load_input(&run_args().input).unwrap();
        assert_eq!(series.len(), 20);
    }
}
