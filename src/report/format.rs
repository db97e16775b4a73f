//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerical code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{Classification, FitResult, ForecastConfig, QualityReport, ScenarioKind, Severity};
use crate::report::{QuarterResidual, largest_residuals};
use crate::scenario::ForecastRun;

/// Format a quality report.
pub fn format_quality(report: &QualityReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Quality score: {}/100 | valid={} missing={} total={} | outliers={} declines={}\n",
        report.score,
        report.valid_count,
        report.missing_count,
        report.total_count,
        report.outlier_count,
        report.non_monotonic_count,
    ));
    for issue in &report.issues {
        let tag = match issue.severity {
            Severity::Good => "ok  ",
            Severity::Warning => "warn",
            Severity::Critical => "crit",
        };
        out.push_str(&format!("  [{tag}] {}\n", issue.message));
    }
    out
}

/// Quarters named in the largest-residual line of the fit table.
const LARGEST_RESIDUALS_SHOWN: usize = 3;

/// Format fitted parameters, metrics, and an in-sample table.
pub fn format_fit(fit: &FitResult, residuals: &[QuarterResidual]) -> String {
    let mut out = String::new();
    out.push_str("Fitted curve: y(t) = K * exp(-exp(-b * (t - t0)))\n");
    out.push_str(&format!("- K  : {}\n", fmt_num(fit.params.k)));
    out.push_str(&format!("- b  : {:.6}\n", fit.params.b));
    out.push_str(&format!("- t0 : {:.4}\n", fit.params.t0));
    out.push_str(&format!(
        "- R2={:.4} RMSE={}{}\n",
        fit.r2,
        fmt_num(fit.rmse),
        if fit.valid { "" } else { " (INVALID: non-finite predictions)" }
    ));

    if residuals.is_empty() {
        return out;
    }
    out.push('\n');
    out.push_str(
        format!(
            "{:<12} {:>14} {:>14} {:>14} {:<13}\n",
            "period", "observed", "fitted", "residual", "flag"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14} {:-<14} {:-<14} {:-<13}\n", "", "", "", "", "").trim_end());
    out.push('\n');
    for r in residuals {
        out.push_str(
            format!(
                "{:<12} {:>14} {:>14} {:>14} {:<13}\n",
                truncate(&r.period_label, 12),
                fmt_num(r.observed),
                fmt_num(r.fitted),
                fmt_num(r.residual),
                flag(r),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let largest: Vec<String> = largest_residuals(residuals, LARGEST_RESIDUALS_SHOWN)
        .iter()
        .filter(|r| r.residual.is_finite())
        .map(|r| format!("{} ({})", r.period_label, fmt_num(r.residual)))
        .collect();
    if !largest.is_empty() {
        out.push_str(&format!("Largest residuals: {}\n", largest.join(", ")));
    }
    out
}

/// Format the forecast table and per-scenario summaries.
pub fn format_forecast(run: &ForecastRun) -> String {
    let b = &run.bundle;
    let mut out = String::new();
    out.push_str(&format!(
        "Forecast: {} quarter(s), interventions from t={} | uncertainty +/-{}%\n\n",
        b.periods.len(),
        run.launch_quarter_effective,
        b.uncertainty_percent
    ));

    out.push_str(
        format!(
            "{:<12} {:>14} {:>14} {:>14} {:>14}\n",
            "period", "baseline", "conservative", "moderate", "aggressive"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14} {:-<14} {:-<14} {:-<14}\n", "", "", "", "", "").trim_end());
    out.push('\n');
    for (i, period) in b.periods.iter().enumerate() {
        let cell = |v: &[f64]| v.get(i).copied().map(fmt_num).unwrap_or_default();
        out.push_str(
            format!(
                "{:<12} {:>14} {:>14} {:>14} {:>14}\n",
                truncate(period, 12),
                cell(&b.baseline),
                cell(&b.conservative),
                cell(&b.moderate),
                cell(&b.aggressive),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str("\nScenario summary (final quarter vs baseline):\n");
    for s in &run.summaries {
        out.push_str(&format!(
            "- {:<12} final={} cumulative={} uplift={} ({})\n",
            s.scenario.display_name(),
            fmt_num(s.final_value),
            fmt_num(s.cumulative),
            fmt_num(s.uplift_final),
            fmt_pct(s.uplift_final_pct),
        ));
    }
    out
}

/// Format the full run: quality before/after repair, fit, forecast.
pub fn format_run_summary(output: &RunOutput, residuals: &[QuarterResidual], config: &ForecastConfig) -> String {
    let mut out = String::new();
    out.push_str("=== gcast - Gompertz growth forecast ===\n");
    out.push_str(&format!(
        "Missing policy: {:?} | horizon={} | launch quarter={}\n\n",
        config.missing_policy, config.horizon, config.launch_quarter
    ));

    if output.repaired > 0 {
        out.push_str(&format!("Before repair: {}/100\n", output.initial_quality.score));
        out.push_str(&format!("Filled {} missing point(s).\n", output.repaired));
    }
    out.push_str(&format_quality(&output.quality));
    out.push('\n');
    out.push_str(&format_fit(&output.fit, residuals));
    out.push('\n');
    out.push_str(&format_forecast(&output.forecast));

    let params = &config.scenarios;
    out.push_str("\nScenario parameters:\n");
    for kind in ScenarioKind::ALL {
        let p = params.get(kind);
        out.push_str(&format!(
            "- {:<12} alpha={} delta_t={} kappa={} half_life={} window={} expansion={}\n",
            kind.display_name(),
            p.alpha,
            p.delta_t,
            p.kappa,
            p.half_life,
            p.window_length,
            p.expansion_length
        ));
    }
    out
}

fn flag(r: &QuarterResidual) -> &'static str {
    if r.is_outlier {
        return "outlier";
    }
    match r.classification {
        Classification::Original | Classification::Missing => "",
        Classification::Interpolated => "interpolated",
        Classification::Corrected => "corrected",
        Classification::Confirmed => "confirmed",
    }
}

fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    if v.abs() >= 1000.0 { format!("{v:.0}") } else { format!("{v:.3}") }
}

fn fmt_pct(v: f64) -> String {
    if v.is_finite() { format!("{v:+.2}%") } else { "n/a".to_string() }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastBundle, GompertzParams, QualityIssue};
    use crate::scenario::ScenarioSummary;

    #[test]
    fn numbers_render_without_nan() {
        assert_eq!(fmt_num(f64::NAN), "n/a");
        assert_eq!(fmt_num(2_235_095.4), "2235095");
        assert_eq!(fmt_num(0.5), "0.500");
        assert_eq!(fmt_pct(12.5), "+12.50%");
        assert_eq!(fmt_pct(f64::INFINITY), "n/a");
    }

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("2024Q1", 12), "2024Q1");
        assert_eq!(truncate("abcdefghijklmnop", 5), "abcd.");
    }

    #[test]
    fn quality_lists_issues() {
        let report = QualityReport {
            score: 90,
            issues: vec![QualityIssue {
                severity: Severity::Warning,
                message: "1 missing value(s) (-10).".to_string(),
            }],
            missing_count: 1,
            valid_count: 19,
            total_count: 20,
            outlier_count: 0,
            non_monotonic_count: 0,
        };
        let text = format_quality(&report);
        assert!(text.starts_with("Quality score: 90/100"));
        assert!(text.contains("[warn] 1 missing value(s)"));
    }

    #[test]
    fn forecast_table_has_one_row_per_period() {
        let run = ForecastRun {
            bundle: ForecastBundle {
                periods: vec!["2024Q1".into(), "2024Q2".into()],
                baseline: vec![100.0, f64::NAN],
                conservative: vec![100.0, 110.0],
                moderate: vec![100.0, 120.0],
                aggressive: vec![100.0, 130.0],
                uncertainty_percent: 5.0,
            },
            summaries: vec![ScenarioSummary {
                scenario: ScenarioKind::Moderate,
                final_value: 120.0,
                cumulative: 220.0,
                uplift_final: 20.0,
                uplift_final_pct: 20.0,
            }],
            launch_quarter_effective: 21.0,
        };
        let text = format_forecast(&run);
        assert!(text.contains("uncertainty +/-5%"));
        assert!(text.lines().any(|l| l.starts_with("2024Q2") && l.contains("n/a")));
        assert!(text.contains("moderate"));
        assert!(text.contains("(+20.00%)"));
    }

    #[test]
    fn invalid_fit_is_called_out() {
        let fit = FitResult {
            params: GompertzParams::new(1.0, 0.1, 0.0),
            r2: 0.0,
            rmse: 1.0,
            valid: false,
        };
        assert!(format_fit(&fit, &[]).contains("INVALID"));
    }

    #[test]
    fn fit_table_names_largest_residuals() {
        let fit = FitResult {
            params: GompertzParams::new(100.0, 0.3, 5.0),
            r2: 0.9,
            rmse: 2.0,
            valid: true,
        };
        let row = |label: &str, residual: f64| QuarterResidual {
            period_label: label.to_string(),
            observed: 50.0 + residual,
            fitted: 50.0,
            residual,
            classification: Classification::Original,
            is_outlier: false,
        };
        let rows = vec![
            row("2020Q1", 0.5),
            row("2020Q2", -4.0),
            row("2020Q3", f64::NAN),
            row("2020Q4", 2.0),
            row("2021Q1", 1.0),
        ];
        let text = format_fit(&fit, &rows);
        assert!(
            text.contains("Largest residuals: 2020Q2 (-4.000), 2020Q4 (2.000), 2021Q1 (1.000)"),
            "{text}"
        );
        assert!(!format_fit(&fit, &[]).contains("Largest residuals"));
    }
}
