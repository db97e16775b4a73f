//! Multi-scenario forecast assembly.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::periods::forecast_labels;
use crate::domain::types::nan_as_null;
use crate::domain::{FitResult, ForecastBundle, ForecastConfig, ScenarioKind};
use crate::models::predict;
use crate::scenario::intervention::apply_intervention;

/// Headline numbers for one scenario over the forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario: ScenarioKind,
    /// Last finite value of the horizon.
    #[serde(with = "nan_as_null::scalar")]
    pub final_value: f64,
    /// Sum of the finite values.
    #[serde(with = "nan_as_null::scalar")]
    pub cumulative: f64,
    /// `final_value` minus the baseline's final value.
    #[serde(with = "nan_as_null::scalar")]
    pub uplift_final: f64,
    /// `uplift_final` as a percentage of the baseline's final value (`NaN` when that is 0).
    #[serde(with = "nan_as_null::scalar")]
    pub uplift_final_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    pub bundle: ForecastBundle,
    pub summaries: Vec<ScenarioSummary>,
    /// Model time at which the interventions start.
    pub launch_quarter_effective: f64,
}

/// Uncertainty band (percent) implied by a quality score.
pub fn uncertainty_percent(quality_score: u8) -> f64 {
    match quality_score {
        95.. => 2.0,
        80..=94 => 5.0,
        _ => 8.0,
    }
}

/// Project the baseline and the three scenarios over `config.horizon` quarters.
///
/// Forecast step `h` (0-based) is model time `t = historical_len + h`, so the
/// first forecast quarter directly continues the history. Interventions start
/// at `t = historical_len + launch_quarter`.
pub fn run_forecast(
    fit: &FitResult,
    historical_len: usize,
    last_label: &str,
    quality_score: u8,
    config: &ForecastConfig,
) -> ForecastRun {
    let horizon = config.horizon;
    let launch = (historical_len + config.launch_quarter) as f64;
    let times: Vec<f64> = (0..horizon).map(|h| (historical_len + h) as f64).collect();

    let baseline: Vec<f64> = times.iter().map(|&t| predict(&fit.params, t)).collect();
    let scenario_series = |kind: ScenarioKind| -> Vec<f64> {
        let params = config.scenarios.get(kind);
        times
            .iter()
            .zip(&baseline)
            .map(|(&t, &base)| apply_intervention(t, base, &fit.params, params, launch))
            .collect()
    };

    let bundle = ForecastBundle {
        periods: forecast_labels(last_label, horizon),
        conservative: scenario_series(ScenarioKind::Conservative),
        moderate: scenario_series(ScenarioKind::Moderate),
        aggressive: scenario_series(ScenarioKind::Aggressive),
        baseline,
        uncertainty_percent: uncertainty_percent(quality_score),
    };

    let summaries: Vec<ScenarioSummary> = ScenarioKind::ALL
        .iter()
        .map(|&kind| summarize(kind, &bundle.baseline, bundle.scenario(kind)))
        .collect();
    for s in &summaries {
        debug!(scenario = s.scenario.display_name(), final_value = s.final_value, uplift_pct = s.uplift_final_pct, "scenario summary");
    }
    info!(horizon, launch, uncertainty = bundle.uncertainty_percent, "forecast assembled");

    ForecastRun {
        bundle,
        summaries,
        launch_quarter_effective: launch,
    }
}

fn summarize(kind: ScenarioKind, baseline: &[f64], values: &[f64]) -> ScenarioSummary {
    let final_value = last_finite(values);
    let base_final = last_finite(baseline);
    let cumulative = values.iter().filter(|v| v.is_finite()).sum::<f64>();
    let uplift_final = final_value - base_final;
    let uplift_final_pct = if base_final != 0.0 {
        uplift_final / base_final * 100.0
    } else {
        f64::NAN
    };
    ScenarioSummary {
        scenario: kind,
        final_value,
        cumulative,
        uplift_final,
        uplift_final_pct,
    }
}

fn last_finite(values: &[f64]) -> f64 {
    values.iter().rev().copied().find(|v| v.is_finite()).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GompertzParams;

    fn fit() -> FitResult {
        FitResult {
            params: GompertzParams::new(1000.0, 0.2, 10.0),
            r2: 0.99,
            rmse: 1.0,
            valid: true,
        }
    }

    #[test]
    fn uncertainty_steps() {
        assert_eq!(uncertainty_percent(100), 2.0);
        assert_eq!(uncertainty_percent(95), 2.0);
        assert_eq!(uncertainty_percent(94), 5.0);
        assert_eq!(uncertainty_percent(80), 5.0);
        assert_eq!(uncertainty_percent(79), 8.0);
        assert_eq!(uncertainty_percent(0), 8.0);
    }

    #[test]
    fn bundle_shape_and_labels() {
        let config = ForecastConfig { horizon: 6, ..Default::default() };
        let run = run_forecast(&fit(), 20, "2023Q4", 95, &config);
        let b = &run.bundle;
        assert_eq!(b.periods, vec!["2024Q1", "2024Q2", "2024Q3", "2024Q4", "2025Q1", "2025Q2"]);
        for kind in ScenarioKind::ALL {
            assert_eq!(b.scenario(kind).len(), 6);
        }
        assert_eq!(b.uncertainty_percent, 2.0);
        assert_eq!(run.launch_quarter_effective, 21.0);
    }

    #[test]
    fn baseline_continues_history_axis() {
        let config = ForecastConfig { horizon: 3, ..Default::default() };
        let run = run_forecast(&fit(), 20, "x", 100, &config);
        for (h, v) in run.bundle.baseline.iter().enumerate() {
            assert_eq!(*v, predict(&fit().params, (20 + h) as f64));
        }
    }

    #[test]
    fn scenarios_match_baseline_before_launch_and_rise_after() {
        let config = ForecastConfig {
            horizon: 8,
            launch_quarter: 3,
            ..Default::default()
        };
        let run = run_forecast(&fit(), 20, "x", 90, &config);
        let b = &run.bundle;
        for h in 0..3 {
            assert_eq!(b.conservative[h], b.baseline[h]);
            assert_eq!(b.aggressive[h], b.baseline[h]);
        }
        for h in 3..8 {
            assert!(b.conservative[h] > b.baseline[h]);
            assert!(b.moderate[h] > b.conservative[h]);
            assert!(b.aggressive[h] > b.moderate[h]);
        }
    }

    #[test]
    fn summaries_report_uplift_over_baseline() {
        let config = ForecastConfig::default();
        let run = run_forecast(&fit(), 20, "x", 90, &config);
        assert_eq!(run.summaries.len(), 3);
        let base_final = *run.bundle.baseline.last().unwrap();
        for s in &run.summaries {
            let series = run.bundle.scenario(s.scenario);
            assert_eq!(s.final_value, *series.last().unwrap());
            assert!((s.cumulative - series.iter().sum::<f64>()).abs() < 1e-6);
            assert!((s.uplift_final - (s.final_value - base_final)).abs() < 1e-9);
            assert!(s.uplift_final_pct > 0.0);
        }
    }

    #[test]
    fn summary_skips_non_finite_entries() {
        let s = summarize(ScenarioKind::Moderate, &[100.0, f64::NAN], &[110.0, f64::NAN]);
        assert_eq!(s.final_value, 110.0);
        assert_eq!(s.cumulative, 110.0);
        assert!((s.uplift_final_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_fit_yields_nan_sentinels() {
        let broken = FitResult {
            params: GompertzParams::new(-1.0, 0.2, 10.0),
            ..fit()
        };
        let config = ForecastConfig { horizon: 4, ..Default::default() };
        let run = run_forecast(&broken, 20, "x", 90, &config);
        assert!(run.bundle.baseline.iter().all(|v| v.is_nan()));
        // Scenarios fall back to the (NaN) baseline.
        assert!(run.bundle.moderate.iter().all(|v| v.is_nan()));
        assert!(run.summaries[0].final_value.is_nan());
    }
}
