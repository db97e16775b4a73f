//! Reporting utilities: in-sample residuals and formatted terminal output.

use crate::domain::{Classification, FitResult, ObservedPoint};
use crate::models::predict;

pub mod format;

pub use format::*;

/// Observed vs fitted value for one historical quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterResidual {
    pub period_label: String,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
    pub classification: Classification,
    pub is_outlier: bool,
}

/// Fitted values and residuals for every valid point.
///
/// Points are placed on the same filtered axis the fit used, so with gaps left
/// in place the `i`-th valid point is evaluated at `t = i`.
pub fn compute_residuals(series: &[ObservedPoint], fit: &FitResult) -> Vec<QuarterResidual> {
    series
        .iter()
        .filter_map(|p| p.valid_value().map(|v| (p, v)))
        .enumerate()
        .map(|(t, (p, observed))| {
            let fitted = predict(&fit.params, t as f64);
            QuarterResidual {
                period_label: p.period_label.clone(),
                observed,
                fitted,
                residual: observed - fitted,
                classification: p.classification,
                is_outlier: p.is_outlier,
            }
        })
        .collect()
}

/// Residuals with the largest absolute value first; non-finite ones last.
pub fn largest_residuals(residuals: &[QuarterResidual], top_n: usize) -> Vec<QuarterResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        let (a, b) = (abs_or_neg(a.residual), abs_or_neg(b.residual));
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}

fn abs_or_neg(v: f64) -> f64 {
    if v.is_finite() { v.abs() } else { -1.0 }
}
