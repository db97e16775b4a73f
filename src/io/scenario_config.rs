//! Scenario parameter files (TOML).
//!
//! ```toml
//! launch_quarter = 2
//! horizon = 16
//!
//! [moderate]
//! alpha = 0.25
//! kappa = 0.12
//! ```
//!
//! Every key is optional; anything omitted keeps the built-in default.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{ForecastConfig, ScenarioKind, ScenarioParams};
use crate::error::AppError;

/// Environment variable naming a default scenario file.
pub const SCENARIOS_ENV: &str = "GOMPERTZ_SCENARIOS";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub launch_quarter: Option<usize>,
    pub horizon: Option<usize>,
    pub conservative: Option<ScenarioOverrides>,
    pub moderate: Option<ScenarioOverrides>,
    pub aggressive: Option<ScenarioOverrides>,
}

/// Per-scenario overrides; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioOverrides {
    pub alpha: Option<f64>,
    pub delta_t: Option<f64>,
    pub kappa: Option<f64>,
    pub half_life: Option<f64>,
    pub window_length: Option<f64>,
    pub expansion_length: Option<f64>,
}

impl ScenarioOverrides {
    fn apply(&self, params: &mut ScenarioParams) {
        let fields = [
            (self.alpha, &mut params.alpha),
            (self.delta_t, &mut params.delta_t),
            (self.kappa, &mut params.kappa),
            (self.half_life, &mut params.half_life),
            (self.window_length, &mut params.window_length),
            (self.expansion_length, &mut params.expansion_length),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

impl ScenarioFile {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::input(format!("Failed to read scenario file '{}': {e}", path.display()))
        })?;
        let file = Self::from_toml_str(&text)
            .map_err(|e| AppError::input(format!("{}: {}", path.display(), e.message())))?;
        info!(path = %path.display(), "scenario file loaded");
        Ok(file)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::input(format!("Invalid scenario TOML: {e}")))
    }

    fn overrides(&self, kind: ScenarioKind) -> Option<&ScenarioOverrides> {
        match kind {
            ScenarioKind::Conservative => self.conservative.as_ref(),
            ScenarioKind::Moderate => self.moderate.as_ref(),
            ScenarioKind::Aggressive => self.aggressive.as_ref(),
        }
    }

    /// Layer this file's values over `config`.
    pub fn apply(&self, config: &mut ForecastConfig) {
        if let Some(launch) = self.launch_quarter {
            config.launch_quarter = launch;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        for kind in ScenarioKind::ALL {
            if let Some(overrides) = self.overrides(kind) {
                let params = match kind {
                    ScenarioKind::Conservative => &mut config.scenarios.conservative,
                    ScenarioKind::Moderate => &mut config.scenarios.moderate,
                    ScenarioKind::Aggressive => &mut config.scenarios.aggressive,
                };
                overrides.apply(params);
                debug!(scenario = kind.display_name(), ?params, "scenario overridden");
            }
        }
    }
}

/// Scenario file to use: the explicit path, else `$GOMPERTZ_SCENARIOS` if set.
pub fn resolve_scenario_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var_os(SCENARIOS_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// Reject configurations the forecast cannot run with.
pub fn validate_config(config: &ForecastConfig) -> Result<(), AppError> {
    if config.horizon == 0 {
        return Err(AppError::input("horizon must be at least 1 quarter."));
    }
    if config.launch_quarter == 0 {
        return Err(AppError::input("launch_quarter is 1-based and must be at least 1."));
    }
    for kind in ScenarioKind::ALL {
        validate_scenario(kind, config.scenarios.get(kind))?;
    }
    Ok(())
}

fn validate_scenario(kind: ScenarioKind, p: &ScenarioParams) -> Result<(), AppError> {
    let positive = [
        ("alpha", p.alpha),
        ("kappa", p.kappa),
        ("half_life", p.half_life),
        ("window_length", p.window_length),
        ("expansion_length", p.expansion_length),
    ];
    for (name, v) in positive {
        if !(v.is_finite() && v > 0.0) {
            return Err(AppError::input(format!(
                "[{}] {name} must be a positive number, got {v}.",
                kind.display_name()
            )));
        }
    }
    if !(p.delta_t.is_finite() && p.delta_t >= 0.0) {
        return Err(AppError::input(format!(
            "[{}] delta_t must be a non-negative number, got {}.",
            kind.display_name(),
            p.delta_t
        )));
    }
    Ok(())
}
