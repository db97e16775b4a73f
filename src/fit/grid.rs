//! Coarse parameter grid for the initial Gompertz search.
//!
//! The grid is fixed so fits are reproducible: the same series always
//! enumerates the same candidates in the same order (K, then b, then t0).

use crate::domain::GompertzParams;

/// Multipliers of the observed maximum tried for `K`.
pub const K_MULTIPLIERS: [f64; 5] = [1.1, 1.3, 1.5, 2.0, 2.5];

/// Growth rates tried for `b`.
pub const B_STEPS: [f64; 6] = [0.05, 0.1, 0.15, 0.2, 0.3, 0.4];

/// Fallback starting point when no grid candidate is usable: `K = max * 1.5`.
pub const FALLBACK_K_MULTIPLIER: f64 = 1.5;
/// Fallback `b`.
pub const FALLBACK_B: f64 = 0.2;
/// Fallback `t0 = n * 0.5`.
pub const FALLBACK_T0_FRACTION: f64 = 0.5;

/// Inflection times tried for a series of length `n`:
/// `{-2, 0, 0.3n, 0.5n, 0.7n, n+2}`.
pub fn t0_candidates(n: usize) -> [f64; 6] {
    let n = n as f64;
    [-2.0, 0.0, 0.3 * n, 0.5 * n, 0.7 * n, n + 2.0]
}

/// All admissible grid candidates in enumeration order.
///
/// Candidates with `K <= max` or `b` outside `(0, 1]` are dropped.
pub fn candidate_grid(max: f64, n: usize) -> Vec<GompertzParams> {
    let t0s = t0_candidates(n);
    let mut out = Vec::with_capacity(K_MULTIPLIERS.len() * B_STEPS.len() * t0s.len());
    for &km in &K_MULTIPLIERS {
        let k = max * km;
        if !(k > max) {
            continue;
        }
        for &b in &B_STEPS {
            if !(b > 0.0 && b <= 1.0) {
                continue;
            }
            for &t0 in &t0s {
                out.push(GompertzParams::new(k, b, t0));
            }
        }
    }
    out
}

/// Heuristic starting point used when the grid yields nothing usable.
pub fn fallback_params(max: f64, n: usize) -> GompertzParams {
    GompertzParams::new(
        max * FALLBACK_K_MULTIPLIER,
        FALLBACK_B,
        n as f64 * FALLBACK_T0_FRACTION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_full_size_and_order() {
        let grid = candidate_grid(100.0, 20);
        assert_eq!(grid.len(), 5 * 6 * 6);
        assert!((grid[0].k - 110.0).abs() < 1e-9);
        assert_eq!(grid[0].b, 0.05);
        assert_eq!(grid[0].t0, -2.0);
        // t0 varies fastest, then b.
        assert_eq!(grid[1].t0, 0.0);
        assert_eq!(grid[6].b, 0.1);
    }

    #[test]
    fn grid_is_empty_for_non_positive_max() {
        assert!(candidate_grid(0.0, 10).is_empty());
    }

    #[test]
    fn t0_candidates_scale_with_length() {
        assert_eq!(t0_candidates(10), [-2.0, 0.0, 3.0, 5.0, 7.0, 12.0]);
    }
}
