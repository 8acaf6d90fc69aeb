//! Density-profile shape functions.
//!
//! The concentration conversion only needs the dimensionless enclosed-mass
//! shape `mu(c)` of a profile: the mass inside radius `c * r_s` divided by
//! the profile's characteristic mass. Any strictly increasing shape with
//! `mu(0) = 0` works; the default is NFW.
//!
//! Callers plug in alternatives through the `Fn(f64) -> f64` bound on the
//! converter, so a custom profile is just a closure.

/// NFW enclosed-mass shape: `mu(c) = ln(1 + c) - c / (1 + c)`.
///
/// Strictly increasing for `c > 0`, with `mu(0) = 0`.
pub fn nfw_shape(c: f64) -> f64 {
    (1.0 + c).ln() - c / (1.0 + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfw_shape_vanishes_at_zero() {
        assert_eq!(nfw_shape(0.0), 0.0);
    }

    #[test]
    fn nfw_shape_is_strictly_increasing() {
        let grid: Vec<f64> = (1..200).map(|i| i as f64 * 0.25).collect();
        let mut prev = 0.0;
        for &c in &grid {
            let mu = nfw_shape(c);
            assert!(mu > prev, "mu({c}) = {mu} not above {prev}");
            prev = mu;
        }
    }

    #[test]
    fn nfw_shape_spot_value() {
        // mu(1) = ln 2 - 1/2
        let expected = std::f64::consts::LN_2 - 0.5;
        assert!((nfw_shape(1.0) - expected).abs() < 1e-15);
    }
}
