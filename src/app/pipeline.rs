//! Shared pipeline logic used by every `gcast` subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! analyze -> repair -> re-analyze -> fit -> forecast
//!
//! The CLI can then focus on presentation (printing and exports).

use tracing::{info, warn};

use crate::domain::{FillMethod, FitResult, ForecastConfig, ObservedPoint, QualityReport, valid_values};
use crate::error::AppError;
use crate::fit::fit_gompertz;
use crate::interp::{confirm_point, correct_point, repair_missing};
use crate::quality::analyze;
use crate::scenario::{ForecastRun, run_forecast};

/// The series under analysis plus its latest quality report.
///
/// All mutation of the series goes through this value, one step at a time.
#[derive(Debug, Clone)]
pub struct Session {
    pub series: Vec<ObservedPoint>,
    pub quality: Option<QualityReport>,
}

impl Session {
    pub fn new(series: Vec<ObservedPoint>) -> Self {
        Self { series, quality: None }
    }

    /// Re-score the series; refreshes outlier flags.
    pub fn analyze(&mut self) -> &QualityReport {
        self.quality.insert(analyze(&mut self.series))
    }

    /// Replace a flagged value and re-score.
    pub fn correct(&mut self, index: usize, method: FillMethod) -> Option<f64> {
        let value = correct_point(&mut self.series, index, method)?;
        self.analyze();
        Some(value)
    }

    /// Accept a flagged value as genuine and re-score.
    pub fn confirm(&mut self, index: usize) -> bool {
        let confirmed = confirm_point(&mut self.series, index);
        if confirmed {
            self.analyze();
        }
        confirmed
    }

    /// Indices currently flagged as outliers.
    pub fn outlier_indices(&self) -> Vec<usize> {
        self.series
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_outlier)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn last_label(&self) -> &str {
        self.series.last().map(|p| p.period_label.as_str()).unwrap_or_default()
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Quality before any repair.
    pub initial_quality: QualityReport,
    /// Quality of the series that was fitted.
    pub quality: QualityReport,
    /// Number of missing points filled.
    pub repaired: usize,
    pub fit: FitResult,
    pub forecast: ForecastRun,
}

/// Execute the full pipeline and return the computed outputs.
///
/// Under `MissingPolicy::Ignore` the fit sees only the valid points, while
/// the forecast still starts after the full historical length.
pub fn run_pipeline(session: &mut Session, config: &ForecastConfig) -> Result<RunOutput, AppError> {
    // 1) Score the raw series.
    let initial_quality = session.analyze().clone();
    info!(score = initial_quality.score, missing = initial_quality.missing_count, "initial quality");

    // 2) Repair gaps per policy, then re-score what will be fitted.
    let repaired = repair_missing(&mut session.series, config.missing_policy);
    let quality = session.analyze().clone();
    if repaired > 0 {
        info!(repaired, policy = ?config.missing_policy, score = quality.score, "series repaired");
    }

    // 3) Fit.
    let values = valid_values(&session.series);
    if values.is_empty() {
        return Err(AppError::insufficient("No valid values to fit."));
    }
    let fit = fit_gompertz(&values)?;
    if !fit.valid {
        warn!("fit produced non-finite in-sample predictions; forecast may contain gaps");
    }
    info!(k = fit.params.k, b = fit.params.b, t0 = fit.params.t0, r2 = fit.r2, "curve fitted");

    // 4) Forecast.
    let forecast = run_forecast(
        &fit,
        session.series.len(),
        session.last_label(),
        quality.score,
        config,
    );

    Ok(RunOutput {
        initial_quality,
        quality,
        repaired,
        fit,
        forecast,
    })
}
