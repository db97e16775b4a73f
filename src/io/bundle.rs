//! Read/write run JSON files.
//!
//! A run file is the portable record of one pipeline run:
//! - fitted parameters and fit metrics
//! - the quality report the forecast's uncertainty was derived from
//! - the forecast bundle and per-scenario summaries
//!
//! Non-finite forecast entries are written as `null` and read back as `NaN`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FitResult, ForecastConfig, MissingPolicy, QualityReport};
use crate::error::AppError;
use crate::scenario::ForecastRun;

pub const TOOL_NAME: &str = "gcast";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    /// Number of historical quarters (including gaps).
    pub historical_len: usize,
    pub missing_policy: MissingPolicy,
    pub horizon: usize,
    pub launch_quarter: usize,
    pub quality: QualityReport,
    pub fit: FitResult,
    pub forecast: ForecastRun,
}

impl RunFile {
    pub fn new(
        historical_len: usize,
        config: &ForecastConfig,
        quality: QualityReport,
        fit: FitResult,
        forecast: ForecastRun,
    ) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            generated_at: Utc::now(),
            historical_len,
            missing_policy: config.missing_policy,
            horizon: config.horizon,
            launch_quarter: config.launch_quarter,
            quality,
            fit,
            forecast,
        }
    }
}

/// Write a run JSON file.
pub fn write_run_json(path: &Path, run: &RunFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create run JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, run)
        .map_err(|e| AppError::input(format!("Failed to write run JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to write run JSON: {e}")))
}

/// Read a run JSON file.
pub fn read_run_json(path: &Path) -> Result<RunFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open run JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::input(format!("Invalid run JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastBundle, GompertzParams, ScenarioKind};
    use crate::scenario::ScenarioSummary;

    fn sample_run() -> RunFile {
        let quality = QualityReport {
            score: 95,
            issues: Vec::new(),
            missing_count: 0,
            valid_count: 20,
            total_count: 20,
            outlier_count: 0,
            non_monotonic_count: 1,
        };
        let fit = FitResult {
            params: GompertzParams::new(3.0e6, 0.2, 8.0),
            r2: 0.95,
            rmse: 1.0e5,
            valid: true,
        };
        let forecast = ForecastRun {
            bundle: ForecastBundle {
                periods: vec!["2024Q1".into(), "2024Q2".into()],
                baseline: vec![2.3e6, f64::NAN],
                conservative: vec![2.3e6, 2.4e6],
                moderate: vec![2.3e6, 2.5e6],
                aggressive: vec![2.3e6, 2.6e6],
                uncertainty_percent: 2.0,
            },
            summaries: vec![ScenarioSummary {
                scenario: ScenarioKind::Moderate,
                final_value: 2.5e6,
                cumulative: 4.8e6,
                uplift_final: f64::NAN,
                uplift_final_pct: f64::NAN,
            }],
            launch_quarter_effective: 21.0,
        };
        RunFile::new(20, &ForecastConfig::default(), quality, fit, forecast)
    }

    #[test]
    fn write_then_read_preserves_nan_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let run = sample_run();
        write_run_json(&path, &run).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"tool\": \"gcast\""));
        assert!(text.contains("null"));

        let back = read_run_json(&path).unwrap();
        assert_eq!(back.generated_at, run.generated_at);
        assert_eq!(back.fit, run.fit);
        assert_eq!(back.quality, run.quality);
        assert!(back.forecast.bundle.baseline[1].is_nan());
        assert_eq!(back.forecast.bundle.moderate, run.forecast.bundle.moderate);
        assert!(back.forecast.summaries[0].uplift_final_pct.is_nan());
        assert_eq!(back.missing_policy, MissingPolicy::Linear);
    }

    #[test]
    fn reading_garbage_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_run_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
