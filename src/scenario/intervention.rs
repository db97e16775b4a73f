//! Intervention model: how a launched initiative perturbs the baseline curve.
//!
//! After launch (`τ = t - launch` quarters), three adjustments are applied to the
//! fitted parameters before re-evaluating the curve:
//!
//! - acceleration: `b' = b * min(2, 1 + min(alpha, 0.5) * decay(τ))` while
//!   `τ < window_length`, with `decay(τ) = exp(-ln2 * τ / half_life)`
//! - capacity: `K' = K * (1 + min(kappa, 0.2) * s(τ))`, where
//!   `s(τ) = 1 - exp(-3τ / expansion_length)` ramps to 1 at `expansion_length`
//! - timing: `t0' = t0 - clamp(delta_t, 0, 5)`
//!
//! Any non-finite intermediate falls back to the baseline value, so a scenario
//! is never less defined than the baseline it perturbs.

use std::f64::consts::LN_2;

use crate::domain::{GompertzParams, ScenarioParams};
use crate::models::evaluate;

/// Cap applied to `alpha`.
pub const ALPHA_CAP: f64 = 0.5;
/// Cap applied to `kappa`.
pub const KAPPA_CAP: f64 = 0.2;
/// Cap on the growth-rate multiplier.
pub const ACCELERATION_CAP: f64 = 2.0;
/// Cap on the inflection shift, in quarters.
pub const DELTA_T_CAP: f64 = 5.0;
/// Floor for the decay / ramp exponents.
pub const EXPONENT_FLOOR: f64 = -100.0;
/// Ramp steepness of the capacity expansion.
pub const EXPANSION_RATE: f64 = 3.0;

/// Scenario value at time `t`.
///
/// Returns `baseline` unchanged before `launch_quarter`, and whenever the
/// perturbed curve cannot be evaluated to a finite number.
pub fn apply_intervention(
    t: f64,
    baseline: f64,
    fitted: &GompertzParams,
    scenario: &ScenarioParams,
    launch_quarter: f64,
) -> f64 {
    if t < launch_quarter {
        return baseline;
    }
    adjusted_value(t, fitted, scenario, t - launch_quarter).unwrap_or(baseline)
}

fn adjusted_value(t: f64, fitted: &GompertzParams, scenario: &ScenarioParams, tau: f64) -> Option<f64> {
    let b = fitted.b * acceleration_factor(scenario, tau)?;
    let k = fitted.k * capacity_factor(scenario, tau)?;
    let t0 = fitted.t0 - scenario.delta_t.clamp(0.0, DELTA_T_CAP);

    let y = evaluate(t, finite(k)?, finite(b)?, finite(t0)?);
    finite(y)
}

/// Multiplier on `b`; 1 outside the acceleration window.
fn acceleration_factor(scenario: &ScenarioParams, tau: f64) -> Option<f64> {
    if !(tau < scenario.window_length) {
        return Some(1.0);
    }
    // A zero half-life gives -inf, which the floor absorbs; 0/0 stays NaN.
    let exponent = finite((-LN_2 * tau / scenario.half_life).clamp(EXPONENT_FLOOR, 0.0))?;
    let decay = finite(exponent.exp())?;
    let effect = finite(1.0 + scenario.alpha.min(ALPHA_CAP) * decay)?;
    Some(effect.min(ACCELERATION_CAP))
}

/// Multiplier on `K`; fully realized from `expansion_length` on.
fn capacity_factor(scenario: &ScenarioParams, tau: f64) -> Option<f64> {
    let kappa = finite(scenario.kappa)?.min(KAPPA_CAP);
    if !(tau < scenario.expansion_length) {
        return Some(1.0 + kappa);
    }
    let ratio = -EXPANSION_RATE * tau / scenario.expansion_length;
    let exponent = finite(ratio.clamp(EXPONENT_FLOOR, 0.0))?;
    let smoother = 1.0 - finite(exponent.exp())?;
    finite(1.0 + kappa * smoother)
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}
