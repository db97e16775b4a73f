//! Built-in sample data and synthetic series generation.
//!
//! - `SAMPLE_DATASET`: 20 quarters of a real-world-shaped adoption series
//!   (2019Q1..2023Q4) used for demos and regression tests
//! - `generate_synthetic`: a Gompertz curve with multiplicative log-normal noise
//!   and optional random gaps, reproducible from a seed

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ObservedPoint, periods::forecast_labels};
use crate::error::AppError;
use crate::models::evaluate;

/// 20-quarter sample series (one dip at 2023Q1).
pub const SAMPLE_DATASET: [(&str, f64); 20] = [
    ("2019Q1", 28988.0),
    ("2019Q2", 63464.0),
    ("2019Q3", 123250.0),
    ("2019Q4", 213841.0),
    ("2020Q1", 331363.0),
    ("2020Q2", 485284.0),
    ("2020Q3", 671863.0),
    ("2020Q4", 845710.0),
    ("2021Q1", 1043984.0),
    ("2021Q2", 1208356.0),
    ("2021Q3", 1382614.0),
    ("2021Q4", 1532985.0),
    ("2022Q1", 1611465.0),
    ("2022Q2", 1820846.0),
    ("2022Q3", 1916538.0),
    ("2022Q4", 2009153.0),
    ("2023Q1", 1997605.0),
    ("2023Q2", 2059149.0),
    ("2023Q3", 2149965.0),
    ("2023Q4", 2235095.0),
];

/// The sample dataset as observed points.
pub fn sample_points() -> Vec<ObservedPoint> {
    SAMPLE_DATASET
        .iter()
        .map(|(label, v)| ObservedPoint::original(*label, *v))
        .collect()
}

/// The sample dataset values.
pub fn sample_series() -> Vec<f64> {
    SAMPLE_DATASET.iter().map(|(_, v)| *v).collect()
}

/// Settings for a synthetic series.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub k: f64,
    pub b: f64,
    pub t0: f64,
    pub quarters: usize,
    /// Standard deviation of the log-noise (0 disables noise).
    pub noise: f64,
    /// Probability that a quarter is left missing.
    pub missing_prob: f64,
    /// Label of the first quarter, e.g. `2020Q1`.
    pub start_label: String,
}

/// Generate a noisy Gompertz series.
///
/// The same spec and seed always produce the same series.
pub fn generate_synthetic(spec: &SyntheticSpec, seed: u64) -> Result<Vec<ObservedPoint>, AppError> {
    if spec.quarters == 0 {
        return Err(AppError::input("Quarter count must be > 0."));
    }
    if !(spec.k.is_finite() && spec.k > 0.0 && spec.b.is_finite() && spec.b > 0.0 && spec.t0.is_finite()) {
        return Err(AppError::input(
            "Invalid curve parameters (need finite K > 0, b > 0, t0).",
        ));
    }
    if !(spec.noise.is_finite() && spec.noise >= 0.0) {
        return Err(AppError::input("Noise must be finite and >= 0."));
    }
    if !(0.0..1.0).contains(&spec.missing_prob) {
        return Err(AppError::input("Missing probability must be in [0, 1)."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, spec.noise.max(f64::MIN_POSITIVE))
        .map_err(|e| AppError::input(format!("Noise distribution error: {e}")))?;

    let mut labels = vec![spec.start_label.clone()];
    labels.extend(forecast_labels(&spec.start_label, spec.quarters - 1));

    let mut out = Vec::with_capacity(spec.quarters);
    for (i, label) in labels.into_iter().enumerate() {
        let level = evaluate(i as f64, spec.k, spec.b, spec.t0);
        let z: f64 = normal.sample(&mut rng);
        let gap = rng.gen_bool(spec.missing_prob);

        // The first quarter is always observed so the series has an anchor.
        if gap && i > 0 {
            out.push(ObservedPoint::missing(label));
            continue;
        }
        let value = if spec.noise > 0.0 { level * z.exp() } else { level };
        out.push(ObservedPoint::original(label, value.max(0.0)));
    }
    Ok(out)
}
