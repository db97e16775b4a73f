//! Data-quality scoring for a historical series.
//!
//! The score starts at 100 and loses points for:
//!
//! | check            | rule                                   | deduction            |
//! |------------------|----------------------------------------|----------------------|
//! | missing quarters | 1–2 / 3–5 / more                       | 10 each / 30 / 50    |
//! | outliers         | z-score above 2 (needs ≥ 5 valid)      | 5 each               |
//! | non-monotonic    | value below the previous valid value   | 5 each               |
//! | sample size      | < 8 / 8–11 valid points                | 40 / 10              |
//!
//! Outlier flags are written back onto the series. The flags are recomputed
//! from scratch on every call, so analyzing an unchanged series twice yields
//! the same report and the same flags.

use tracing::debug;

use crate::domain::{Classification, ObservedPoint, QualityIssue, QualityReport, Severity};
use crate::math::{mean, population_std};

/// `|z|` above which a point is flagged.
pub const OUTLIER_Z: f64 = 2.0;
/// Minimum valid points before outlier detection runs.
pub const OUTLIER_MIN_POINTS: usize = 5;
/// Deduction per outlier.
pub const OUTLIER_PENALTY: i32 = 5;
/// Deduction per non-monotonic quarter.
pub const NON_MONOTONIC_PENALTY: i32 = 5;
/// Fewer valid points than this is "insufficient".
pub const MIN_VALID_POINTS: usize = 8;
/// Fewer valid points than this (but at least `MIN_VALID_POINTS`) is "limited".
pub const RECOMMENDED_VALID_POINTS: usize = 12;

/// Score `series` and refresh its outlier flags.
pub fn analyze(series: &mut [ObservedPoint]) -> QualityReport {
    let total_count = series.len();
    let missing_count = series.iter().filter(|p| !p.is_valid()).count();
    let valid_count = total_count - missing_count;

    let mut score: i32 = 100;
    let mut issues = Vec::new();

    // Missing values.
    let missing_penalty = missing_deduction(missing_count);
    score -= missing_penalty;
    if missing_count == 0 {
        issues.push(issue(Severity::Good, "No missing values - data completeness is excellent."));
    } else {
        let severity = if missing_count > 5 { Severity::Critical } else { Severity::Warning };
        issues.push(issue(
            severity,
            format!("{missing_count} missing value(s) (-{missing_penalty})."),
        ));
    }

    // Outliers.
    let outlier_count = flag_outliers(series);
    if outlier_count > 0 {
        let penalty = OUTLIER_PENALTY * outlier_count as i32;
        score -= penalty;
        issues.push(issue(
            Severity::Warning,
            format!("{outlier_count} potential outlier(s) with |z| > {OUTLIER_Z} (-{penalty})."),
        ));
    }

    // Monotonicity.
    let non_monotonic_count = count_non_monotonic(series);
    if non_monotonic_count > 0 {
        let penalty = NON_MONOTONIC_PENALTY * non_monotonic_count as i32;
        score -= penalty;
        issues.push(issue(
            Severity::Warning,
            format!("{non_monotonic_count} quarter(s) decline from the previous value (-{penalty})."),
        ));
    }

    // Sample size.
    if valid_count < MIN_VALID_POINTS {
        score -= 40;
        issues.push(issue(
            Severity::Critical,
            format!(
                "Only {valid_count} valid point(s); at least {MIN_VALID_POINTS} are needed \
                 for a reliable fit (-40)."
            ),
        ));
    } else if valid_count < RECOMMENDED_VALID_POINTS {
        score -= 10;
        issues.push(issue(
            Severity::Warning,
            format!("{valid_count} valid points; {RECOMMENDED_VALID_POINTS}+ recommended (-10)."),
        ));
    }

    let score = score.clamp(0, 100) as u8;
    debug!(score, missing_count, outlier_count, non_monotonic_count, "quality analyzed");

    QualityReport {
        score,
        issues,
        missing_count,
        valid_count,
        total_count,
        outlier_count,
        non_monotonic_count,
    }
}

fn missing_deduction(missing: usize) -> i32 {
    match missing {
        0 => 0,
        1..=2 => 10 * missing as i32,
        3..=5 => 30,
        _ => 50,
    }
}

/// Recompute outlier flags; returns the number flagged.
///
/// Confirmed points keep their value in the statistics but are never flagged.
fn flag_outliers(series: &mut [ObservedPoint]) -> usize {
    for p in series.iter_mut() {
        p.is_outlier = false;
    }

    let values: Vec<f64> = series.iter().filter_map(ObservedPoint::valid_value).collect();
    if values.len() < OUTLIER_MIN_POINTS {
        return 0;
    }
    let Some(m) = mean(&values) else {
        return 0;
    };
    let sd = population_std(&values, m);
    if !(sd.is_finite() && sd > 0.0) {
        return 0;
    }

    let mut flagged = 0;
    for p in series.iter_mut() {
        let Some(v) = p.valid_value() else { continue };
        if p.classification == Classification::Confirmed {
            continue;
        }
        if ((v - m) / sd).abs() > OUTLIER_Z {
            p.is_outlier = true;
            flagged += 1;
        }
    }
    flagged
}

fn count_non_monotonic(series: &[ObservedPoint]) -> usize {
    let mut prev: Option<f64> = None;
    let mut count = 0;
    for v in series.iter().filter_map(ObservedPoint::valid_value) {
        if prev.is_some_and(|p| v < p) {
            count += 1;
        }
        prev = Some(v);
    }
    count
}

fn issue(severity: Severity, message: impl Into<String>) -> QualityIssue {
    QualityIssue {
        severity,
        message: message.into(),
    }
}
