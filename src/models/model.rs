//! Gompertz curve evaluation.
//!
//! `y(t) = K * exp(-exp(-b * (t - t0)))`
//!
//! Every component that needs the curve shape (fitting, interpolation,
//! scenarios, forecasting) goes through [`evaluate`].
//!
//! Numerical notes:
//! - both exponents are clamped to `[-EXP_LIMIT, EXP_LIMIT]` before `exp`, so
//!   the inner exponential cannot overflow to infinity
//! - invalid inputs produce `NaN` instead of a panic or garbage value; callers
//!   treat `NaN` as "no valid prediction at this step"

use crate::domain::GompertzParams;

/// Largest exponent magnitude passed to `exp`.
pub const EXP_LIMIT: f64 = 700.0;

/// Evaluate the Gompertz curve at time `t`.
///
/// Returns `NaN` when any argument is non-finite, when `k <= 0` or `b <= 0`,
/// or when an intermediate value is not finite.
pub fn evaluate(t: f64, k: f64, b: f64, t0: f64) -> f64 {
    if !(t.is_finite() && k.is_finite() && b.is_finite() && t0.is_finite()) {
        return f64::NAN;
    }
    if k <= 0.0 || b <= 0.0 {
        return f64::NAN;
    }

    let inner = clamp_exponent(-b * (t - t0)).exp();
    if !inner.is_finite() {
        return f64::NAN;
    }
    let outer = clamp_exponent(-inner).exp();
    if !outer.is_finite() {
        return f64::NAN;
    }

    let y = k * outer;
    if y.is_finite() { y } else { f64::NAN }
}

/// Evaluate the curve for a parameter set.
pub fn predict(params: &GompertzParams, t: f64) -> f64 {
    evaluate(t, params.k, params.b, params.t0)
}

fn clamp_exponent(x: f64) -> f64 {
    x.clamp(-EXP_LIMIT, EXP_LIMIT)
}
