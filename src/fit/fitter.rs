//! Gompertz curve fitting for a single series.
//!
//! Given observations `y_0 .. y_{n-1}` at integer times `0 .. n-1` we:
//!
//! 1. evaluate every coarse grid candidate (parallel) and keep the lowest SSE
//! 2. fall back to a fixed heuristic start if no candidate is usable
//! 3. refine the start with bounded gradient descent (`refine`)
//! 4. clamp the result back into the admissible region (`K > max`, `b ∈ (0, 1]`)
//! 5. report R² / RMSE and whether every in-sample prediction was finite
//!
//! The search is local: fit quality depends on the grid catching a good basin.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{FitResult, GompertzParams};
use crate::error::AppError;
use crate::fit::grid::{candidate_grid, fallback_params};
use crate::fit::refine::{GradientGuard, refine};
use crate::models::{evaluate, predict};

/// `K` forced onto `max * K_CORRECTION` when refinement ends at or below the maximum.
pub const K_CORRECTION: f64 = 1.2;

/// Range `b` is clamped into when it ends outside `(0, 1]`.
pub const B_CORRECTION_RANGE: (f64, f64) = (0.05, 0.5);

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    params: GompertzParams,
    sse: f64,
}

/// Fit the Gompertz curve to `series` (time = index).
///
/// Errors:
/// - empty input or non-finite observations (contract violations)
/// - non-finite final parameters (the fit failed; callers must not forecast)
///
/// A series with no positive observation is not an error: no grid candidate
/// survives, the fallback start has `K = 0`, and the result comes back with
/// `valid == false` and every prediction `NaN`.
pub fn fit_gompertz(series: &[f64]) -> Result<FitResult, AppError> {
    if series.is_empty() {
        return Err(AppError::insufficient("No data points to fit."));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AppError::input("Fit input contains non-finite values."));
    }

    let n = series.len();
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let start = match grid_search(series, max) {
        Some(best) => {
            debug!(
                idx = best.idx,
                sse = best.sse,
                k = best.params.k,
                b = best.params.b,
                t0 = best.params.t0,
                "grid search best"
            );
            best.params
        }
        None => {
            warn!("No finite grid candidate; using heuristic starting point.");
            fallback_params(max, n)
        }
    };

    let refined = refine(series, start, max, &GradientGuard::default());
    let params = correct_params(refined.params, max);

    if !params.is_finite() {
        return Err(AppError::numeric(format!(
            "Gompertz fit failed: non-finite parameters (K={}, b={}, t0={}).",
            params.k, params.b, params.t0
        )));
    }

    Ok(fit_metrics(series, params))
}

/// Evaluate every grid candidate and return the lowest-SSE one.
///
/// Candidates are evaluated in parallel; selection is deterministic: minimum
/// SSE, ties broken by grid order (the first minimum wins).
fn grid_search(y: &[f64], max: f64) -> Option<Candidate> {
    let grid = candidate_grid(max, y.len());

    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, params)| {
            candidate_sse(y, params).map(|sse| Candidate {
                idx,
                params: *params,
                sse,
            })
        })
        .collect();

    let mut iter = candidates.iter();
    let mut best = iter.next()?;
    for c in iter {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }
    Some(*best)
}

/// SSE for one candidate; `None` if any prediction is non-finite.
fn candidate_sse(y: &[f64], params: &GompertzParams) -> Option<f64> {
    let mut sse = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let pred = predict(params, i as f64);
        if !pred.is_finite() {
            return None;
        }
        let r = pred - yi;
        sse += r * r;
    }
    sse.is_finite().then_some(sse)
}

/// Pull refined parameters back into the admissible region.
fn correct_params(mut params: GompertzParams, max: f64) -> GompertzParams {
    if params.k.is_finite() && !(params.k > max) {
        warn!(k = params.k, max, "K not above observed maximum; correcting");
        params.k = max * K_CORRECTION;
    }
    if !(params.b > 0.0 && params.b <= 1.0) {
        warn!(b = params.b, "b outside (0, 1]; clamping");
        params.b = params.b.clamp(B_CORRECTION_RANGE.0, B_CORRECTION_RANGE.1);
    }
    params
}

/// R², RMSE and validity of `params` against `y`.
///
/// Non-finite predictions are left out of the residual sum (and logged);
/// any such prediction marks the fit invalid.
pub fn fit_metrics(y: &[f64], params: GompertzParams) -> FitResult {
    let n = y.len();
    let mean = y.iter().sum::<f64>() / n.max(1) as f64;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mut non_finite = 0usize;
    for (i, &yi) in y.iter().enumerate() {
        ss_tot += (yi - mean) * (yi - mean);
        let pred = evaluate(i as f64, params.k, params.b, params.t0);
        if !pred.is_finite() {
            non_finite += 1;
            continue;
        }
        ss_res += (yi - pred) * (yi - pred);
    }
    if non_finite > 0 {
        warn!(non_finite, "non-finite predictions skipped in fit metrics");
    }

    let r2_raw = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };
    let r2 = if r2_raw.is_finite() { r2_raw.clamp(0.0, 1.0) } else { r2_raw };
    let rmse = (ss_res / n.max(1) as f64).sqrt();

    FitResult {
        params,
        r2,
        rmse,
        valid: non_finite == 0 && r2.is_finite(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::sample_series;

    fn synthetic(k: f64, b: f64, t0: f64, n: usize, noise: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let jitter = if i % 2 == 0 { noise } else { -noise };
                evaluate(i as f64, k, b, t0) + jitter
            })
            .collect()
    }

    #[test]
    fn recovers_known_parameters_on_unit_scale() {
        let y = synthetic(1.0, 0.2, 10.0, 20, 0.003);
        let fit = fit_gompertz(&y).unwrap();
        assert!(fit.valid);
        assert!(fit.r2 > 0.9, "r2={}", fit.r2);
        assert!((fit.params.k - 1.0).abs() < 0.1, "K={}", fit.params.k);
        assert!((fit.params.b - 0.2).abs() < 0.05, "b={}", fit.params.b);
        assert!((fit.params.t0 - 10.0).abs() < 1.0, "t0={}", fit.params.t0);
    }

    #[test]
    fn large_scale_series_fits_well() {
        let y = synthetic(1000.0, 0.2, 10.0, 20, 1.5);
        let fit = fit_gompertz(&y).unwrap();
        assert!(fit.valid);
        assert!(fit.r2 > 0.9, "r2={}", fit.r2);
        assert!((fit.params.k - 1000.0).abs() < 250.0, "K={}", fit.params.k);
    }

    #[test]
    fn k_always_exceeds_observed_maximum() {
        let cases: Vec<Vec<f64>> = vec![
            vec![5.0; 10],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            vec![10.0, 1.0, 10.0, 1.0, 10.0, 1.0, 10.0, 1.0, 10.0],
            vec![0.0, 0.0, 0.0, 1e-9],
            synthetic(50.0, 0.4, 3.0, 12, 0.0),
            vec![42.0],
        ];
        for y in cases {
            let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let fit = fit_gompertz(&y).unwrap();
            assert!(fit.params.k > max, "K={} max={max} for {y:?}", fit.params.k);
            assert!(fit.params.b > 0.0 && fit.params.b <= 1.0);
        }
    }

    #[test]
    fn constant_series_has_zero_r2() {
        let fit = fit_gompertz(&[3.0; 9]).unwrap();
        assert_eq!(fit.r2, 0.0);
    }

    #[test]
    fn grid_search_matches_sequential_first_minimum() {
        let y = synthetic(120.0, 0.3, 6.0, 16, 0.8);
        let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let grid = candidate_grid(max, y.len());

        let mut expected: Option<(usize, f64)> = None;
        for (idx, params) in grid.iter().enumerate() {
            if let Some(sse) = candidate_sse(&y, params) {
                if expected.is_none_or(|(_, best)| sse < best) {
                    expected = Some((idx, sse));
                }
            }
        }

        let best = grid_search(&y, max).unwrap();
        let (idx, sse) = expected.unwrap();
        assert_eq!(best.idx, idx);
        assert_eq!(best.sse, sse);
    }

    #[test]
    fn rejects_contract_violations() {
        assert_eq!(fit_gompertz(&[]).unwrap_err().exit_code(), 3);
        assert_eq!(fit_gompertz(&[1.0, f64::NAN]).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn all_zero_series_yields_invalid_fit() {
        let fit = fit_gompertz(&[0.0; 8]).unwrap();
        assert!(!fit.valid);
        assert_eq!(fit.params, GompertzParams::new(0.0, 0.2, 4.0));
        assert_eq!(fit.r2, 0.0);
        assert!((0..8).all(|i| predict(&fit.params, i as f64).is_nan()));
    }

    #[test]
    fn overflowing_grid_uses_heuristic_start() {
        let y = [1e300, 1.5e300];
        assert!(grid_search(&y, 1.5e300).is_none());

        let fit = fit_gompertz(&y).unwrap();
        assert_eq!(fit.params, fallback_params(1.5e300, 2));
        assert_eq!(fit.params, GompertzParams::new(2.25e300, 0.2, 1.0));
        assert!(!fit.valid);
    }

    #[test]
    fn metrics_skip_non_finite_predictions() {
        let fit = fit_metrics(&[1.0, 2.0, 3.0], GompertzParams::new(-1.0, 0.2, 0.0));
        assert!(!fit.valid);
        assert_eq!(fit.rmse, 0.0);
        assert!(fit.r2.is_finite());
    }

    #[test]
    fn sample_dataset_fit_is_valid() {
        let y = sample_series();
        assert_eq!(y.len(), 20);
        assert_eq!(y[0], 28988.0);
        assert_eq!(y[19], 2235095.0);

        let fit = fit_gompertz(&y).unwrap();
        assert!(fit.valid);
        assert!(fit.params.k > 2_382_030.0, "K={}", fit.params.k);
        assert!(fit.r2 > 0.9, "r2={}", fit.r2);
    }
}
