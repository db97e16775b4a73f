//! Shared domain types.
//!
//! These types are the plain data contract between the numerical core and
//! whatever presents its results:
//!
//! - observed quarterly points (`ObservedPoint`) and how they were produced
//! - fitted curve parameters and fit metrics (`GompertzParams`, `FitResult`)
//! - data-quality diagnostics (`QualityReport`)
//! - scenario configuration and forecast output (`ScenarioParams`, `ForecastBundle`)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How an observed point's current value came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Parsed from input as-is.
    Original,
    /// No value was supplied.
    Missing,
    /// Filled in by an interpolation strategy.
    Interpolated,
    /// Replaced after being flagged (outlier correction).
    Corrected,
    /// Flagged, then confirmed as genuine.
    Confirmed,
}

/// One quarter of the historical series.
///
/// The point's index in its sequence is the model time `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    pub period_label: String,
    pub value: Option<f64>,
    pub is_missing: bool,
    pub classification: Classification,
    pub is_outlier: bool,
}

impl ObservedPoint {
    pub fn original(period_label: impl Into<String>, value: f64) -> Self {
        Self {
            period_label: period_label.into(),
            value: Some(value),
            is_missing: false,
            classification: Classification::Original,
            is_outlier: false,
        }
    }

    pub fn missing(period_label: impl Into<String>) -> Self {
        Self {
            period_label: period_label.into(),
            value: None,
            is_missing: true,
            classification: Classification::Missing,
            is_outlier: false,
        }
    }

    /// The value, if the point is present and finite.
    pub fn valid_value(&self) -> Option<f64> {
        if self.is_missing {
            return None;
        }
        self.value.filter(|v| v.is_finite())
    }

    pub fn is_valid(&self) -> bool {
        self.valid_value().is_some()
    }

    /// Store a filled-in value and reclassify the point.
    pub fn set_filled(&mut self, value: f64, classification: Classification) {
        self.value = Some(value);
        self.is_missing = false;
        self.classification = classification;
    }
}

/// Values of all valid points, in order (the filtered time axis).
pub fn valid_values(series: &[ObservedPoint]) -> Vec<f64> {
    series.iter().filter_map(ObservedPoint::valid_value).collect()
}

/// Parameters of `K * exp(-exp(-b * (t - t0)))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GompertzParams {
    /// Asymptotic capacity.
    pub k: f64,
    /// Growth rate / steepness.
    pub b: f64,
    /// Inflection time.
    pub t0: f64,
}

impl GompertzParams {
    pub fn new(k: f64, b: f64, t0: f64) -> Self {
        Self { k, b, t0 }
    }

    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.b.is_finite() && self.t0.is_finite()
    }
}

/// Output of a curve fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: GompertzParams,
    /// Coefficient of determination, clamped to `[0, 1]`.
    pub r2: f64,
    pub rmse: f64,
    /// `false` when any in-sample prediction was non-finite.
    pub valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub message: String,
}

/// Data-quality diagnostics for the current state of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Heuristic score in `[0, 100]`.
    pub score: u8,
    pub issues: Vec<QualityIssue>,
    pub missing_count: usize,
    pub valid_count: usize,
    pub total_count: usize,
    pub outlier_count: usize,
    pub non_monotonic_count: usize,
}

/// Strategy used to fill a single missing point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    Linear,
    Gompertz,
    Forward,
}

/// What to do with missing points before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Leave gaps; fit on the valid points only.
    Ignore,
    Linear,
    Gompertz,
    Forward,
}

impl MissingPolicy {
    pub fn fill_method(self) -> Option<FillMethod> {
        match self {
            MissingPolicy::Ignore => None,
            MissingPolicy::Linear => Some(FillMethod::Linear),
            MissingPolicy::Gompertz => Some(FillMethod::Gompertz),
            MissingPolicy::Forward => Some(FillMethod::Forward),
        }
    }
}

/// The three named intervention scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Conservative,
    Moderate,
    Aggressive,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Conservative,
        ScenarioKind::Moderate,
        ScenarioKind::Aggressive,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ScenarioKind::Conservative => "conservative",
            ScenarioKind::Moderate => "moderate",
            ScenarioKind::Aggressive => "aggressive",
        }
    }
}

/// Intervention parameters for one scenario.
///
/// `alpha` and `kappa` are clamped when applied (0.5 and 0.2), so configured
/// values above those caps are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Peak growth-rate acceleration (fraction of `b`).
    pub alpha: f64,
    /// Quarters the inflection point is pulled forward.
    pub delta_t: f64,
    /// Capacity expansion (fraction of `K`).
    pub kappa: f64,
    /// Half-life of the acceleration effect, in quarters.
    pub half_life: f64,
    /// Quarters after launch during which acceleration applies.
    pub window_length: f64,
    /// Quarters for the capacity expansion to be fully realized.
    pub expansion_length: f64,
}

impl ScenarioParams {
    pub const CONSERVATIVE: ScenarioParams = ScenarioParams {
        alpha: 0.10,
        delta_t: 0.5,
        kappa: 0.05,
        half_life: 8.0,
        window_length: 12.0,
        expansion_length: 8.0,
    };

    pub const MODERATE: ScenarioParams = ScenarioParams {
        alpha: 0.20,
        delta_t: 1.0,
        kappa: 0.10,
        half_life: 6.0,
        window_length: 12.0,
        expansion_length: 6.0,
    };

    pub const AGGRESSIVE: ScenarioParams = ScenarioParams {
        alpha: 0.35,
        delta_t: 2.0,
        kappa: 0.15,
        half_life: 4.0,
        window_length: 12.0,
        expansion_length: 4.0,
    };
}

/// Parameters for all three scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub conservative: ScenarioParams,
    pub moderate: ScenarioParams,
    pub aggressive: ScenarioParams,
}

impl ScenarioSet {
    pub fn get(&self, kind: ScenarioKind) -> &ScenarioParams {
        match kind {
            ScenarioKind::Conservative => &self.conservative,
            ScenarioKind::Moderate => &self.moderate,
            ScenarioKind::Aggressive => &self.aggressive,
        }
    }
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self {
            conservative: ScenarioParams::CONSERVATIVE,
            moderate: ScenarioParams::MODERATE,
            aggressive: ScenarioParams::AGGRESSIVE,
        }
    }
}

/// Forecast series for one run.
///
/// `NaN` marks a step where the model produced no valid value; it is written
/// as `null` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub periods: Vec<String>,
    #[serde(with = "nan_as_null")]
    pub baseline: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub conservative: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub moderate: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub aggressive: Vec<f64>,
    pub uncertainty_percent: f64,
}

impl ForecastBundle {
    pub fn scenario(&self, kind: ScenarioKind) -> &[f64] {
        match kind {
            ScenarioKind::Conservative => &self.conservative,
            ScenarioKind::Moderate => &self.moderate,
            ScenarioKind::Aggressive => &self.aggressive,
        }
    }
}

/// A full forecast run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus the optional scenario file.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Forecast horizon in quarters.
    pub horizon: usize,
    /// 1-based quarter offset of the intervention launch, counted from the end of history.
    pub launch_quarter: usize,
    pub missing_policy: MissingPolicy,
    pub scenarios: ScenarioSet,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 12,
            launch_quarter: 1,
            missing_policy: MissingPolicy::Linear,
            scenarios: ScenarioSet::default(),
        }
    }
}

/// `NaN` (and other non-finite values) <-> JSON `null`.
pub(crate) mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub mod scalar {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            value.is_finite().then_some(*value).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
        }
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let out: Vec<Option<f64>> = values
            .iter()
            .map(|v| if v.is_finite() { Some(*v) } else { None })
            .collect();
        out.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
