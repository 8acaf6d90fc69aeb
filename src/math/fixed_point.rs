//! Bounded Picard iteration for equations of the form `x = f(x)`.
//!
//! The concentration-conversion map is a contraction for the density-profile
//! regime of physical haloes, but not globally, so the loop carries a hard
//! iteration cap and reports a `Convergence` error when the tolerance is not
//! met within it. The cap doubles as the de facto timeout: nothing else in
//! the engine blocks.

use crate::error::{ConvertError, Result};

/// Default relative tolerance on successive iterates.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Hard cap on iterations.
pub const MAX_ITERATIONS: usize = 100;

/// Solve `x = f(x)` by fixed-point iteration starting from `x0`.
///
/// Stops once the relative change `|x2 - x1| / x2` drops to `tolerance` or
/// below. Non-finite or zero iterates fail immediately: the map has left the
/// domain where the relative-change criterion means anything.
pub fn solve<F>(f: F, x0: f64, tolerance: f64, max_iterations: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut x1 = x0;
    let mut last_error = f64::INFINITY;
    for iteration in 1..=max_iterations {
        let x2 = f(x1);
        if !x2.is_finite() || x2 == 0.0 {
            return Err(ConvertError::Convergence {
                iterations: iteration,
                last_error,
                tolerance,
            });
        }
        last_error = ((x2 - x1) / x2).abs();
        if last_error <= tolerance {
            return Ok(x2);
        }
        x1 = x2;
    }
    Err(ConvertError::Convergence {
        iterations: max_iterations,
        last_error,
        tolerance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_converges_on_contraction() {
        // x = 0.5 (x + 2/x) has the fixed point sqrt(2).
        let root = solve(|x| 0.5 * (x + 2.0 / x), 1.0, 1e-9, MAX_ITERATIONS).unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-8);
    }

    #[test]
    fn solve_returns_immediately_at_fixed_point() {
        let x = solve(|x| x, 3.0, DEFAULT_TOLERANCE, MAX_ITERATIONS).unwrap();
        assert_eq!(x, 3.0);
    }

    #[test]
    fn solve_hits_cap_on_expanding_map() {
        // x -> 2x + 1 runs away from its fixed point at -1; the relative
        // change settles near 1/2 and never reaches the tolerance.
        let err = solve(|x| 2.0 * x + 1.0, 1.0, DEFAULT_TOLERANCE, 50).unwrap_err();
        match err {
            ConvertError::Convergence { iterations, .. } => assert_eq!(iterations, 50),
            other => panic!("expected Convergence, got {other:?}"),
        }
    }

    #[test]
    fn solve_rejects_non_finite_iterates() {
        let err = solve(|x| (x - 1.0).ln(), 0.5, DEFAULT_TOLERANCE, MAX_ITERATIONS).unwrap_err();
        assert!(matches!(err, ConvertError::Convergence { .. }));
    }
}
