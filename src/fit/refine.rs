//! Bounded gradient refinement of a grid-search starting point.
//!
//! Plain gradient descent on the squared error
//!
//! ```text
//! E(K, b, t0) = Σ_i (y(i) - y_i)^2,   y(t) = K * g,  g = exp(-u),  u = exp(-b (t - t0))
//! ```
//!
//! with closed-form partials through the nested exponentials:
//!
//! ```text
//! ∂y/∂K  = g
//! ∂y/∂b  = K g u (t - t0)
//! ∂y/∂t0 = -K g u b
//! ```
//!
//! The loop runs a fixed number of iterations and never leaves the feasible
//! box: the first rejected step ends refinement and the last accepted
//! parameters are returned. See [`GradientGuard`] for the overflow policy.

use nalgebra::Vector3;
use tracing::debug;

use crate::domain::GompertzParams;

/// Number of descent iterations.
pub const REFINE_ITERATIONS: usize = 50;

/// Step size applied to the raw gradient.
pub const LEARNING_RATE: f64 = 0.001;

/// Upper bound of the accepted `K` range, as a multiple of the observed maximum.
pub const K_UPPER_MULTIPLIER: f64 = 5.0;

/// Open interval of accepted `b` values during refinement.
pub const B_RANGE: (f64, f64) = (0.01, 1.0);

/// Overflow policy for the gradient accumulation.
///
/// - a data point whose exponent `|-b (i - t0)|` exceeds `skip_exponent`
///   contributes nothing to the gradient (the iteration continues)
/// - a non-finite accumulated gradient aborts refinement
#[derive(Debug, Clone, Copy)]
pub struct GradientGuard {
    pub skip_exponent: f64,
}

impl Default for GradientGuard {
    fn default() -> Self {
        Self { skip_exponent: 100.0 }
    }
}

impl GradientGuard {
    fn skips(&self, exponent: f64) -> bool {
        exponent.abs() > self.skip_exponent
    }
}

/// Why refinement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStop {
    /// All iterations ran.
    Completed,
    /// The accumulated gradient was not finite.
    NonFiniteGradient,
    /// A step left the feasible region.
    OutOfBounds,
}

/// Result of a refinement pass.
#[derive(Debug, Clone, Copy)]
pub struct Refinement {
    pub params: GompertzParams,
    /// Number of accepted steps.
    pub steps: usize,
    pub stop: RefineStop,
}

/// Gradient of the squared error at `params`, in `(K, b, t0)` order.
pub fn squared_error_gradient(
    y: &[f64],
    params: &GompertzParams,
    guard: &GradientGuard,
) -> Vector3<f64> {
    let GompertzParams { k, b, t0 } = *params;
    let mut grad = Vector3::zeros();
    for (i, &yi) in y.iter().enumerate() {
        let dt = i as f64 - t0;
        let exponent = -b * dt;
        if guard.skips(exponent) {
            continue;
        }
        let u = exponent.exp();
        let g = (-u).exp();
        let pred = k * g;
        let r2 = 2.0 * (pred - yi);
        grad += Vector3::new(g, k * g * u * dt, -k * g * u * b) * r2;
    }
    grad
}

/// Refine `start` by bounded gradient descent.
///
/// `max` is the observed maximum; accepted steps keep `K` in
/// `(max, K_UPPER_MULTIPLIER * max)` and `b` in `B_RANGE`.
pub fn refine(y: &[f64], start: GompertzParams, max: f64, guard: &GradientGuard) -> Refinement {
    let mut current = Vector3::new(start.k, start.b, start.t0);
    let mut steps = 0;
    let mut stop = RefineStop::Completed;

    for _ in 0..REFINE_ITERATIONS {
        let params = GompertzParams::new(current.x, current.y, current.z);
        let grad = squared_error_gradient(y, &params, guard);
        if !grad.iter().all(|g| g.is_finite()) {
            stop = RefineStop::NonFiniteGradient;
            break;
        }

        let next = current - grad * LEARNING_RATE;
        if !in_bounds(&next, max) {
            stop = RefineStop::OutOfBounds;
            break;
        }
        current = next;
        steps += 1;
    }

    let params = GompertzParams::new(current.x, current.y, current.z);
    debug!(steps, ?stop, k = params.k, b = params.b, t0 = params.t0, "refinement finished");
    Refinement { params, steps, stop }
}

fn in_bounds(p: &Vector3<f64>, max: f64) -> bool {
    let (k, b, t0) = (p.x, p.y, p.z);
    k.is_finite()
        && b.is_finite()
        && t0.is_finite()
        && k > max
        && k < K_UPPER_MULTIPLIER * max
        && b > B_RANGE.0
        && b < B_RANGE.1
}
