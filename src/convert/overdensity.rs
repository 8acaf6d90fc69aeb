//! Critical-overdensity resolution.
//!
//! `<number>c` identifiers are literal multiples of the critical density and
//! need no cosmology. `vir` uses the Bryan & Norman (1998) fit and needs
//! `omega_m` and the scale factor. Mean-density identifiers (`200m`) have
//! fit tables but no critical-density equivalent, so they never reach this
//! module: [`crate::domain::OverdensityThreshold::parse`] rejects them.

use std::f64::consts::PI;

use crate::domain::OverdensityThreshold;
use crate::error::{ConvertError, Result};

/// Matter density parameter at scale factor `a` for a flat universe.
///
/// Radiation and curvature are fixed at zero: `omega_lambda = 1 - omega_m`.
fn omega_at(a: f64, omega_m: f64) -> f64 {
    let matter = omega_m * a.powi(-3);
    matter / (matter + (1.0 - omega_m))
}

/// Virial overdensity in units of the critical density (Bryan & Norman fit).
///
/// `18 pi^2 + 82 x - 39 x^2` with `x = Omega(a) - 1`; approximately 101 for
/// `omega_m = 0.3` at `a = 1`, rising towards `18 pi^2` at early times.
pub fn virial_overdensity(a: f64, omega_m: f64) -> f64 {
    let x = omega_at(a, omega_m) - 1.0;
    18.0 * PI * PI + 82.0 * x - 39.0 * x * x
}

/// Resolve a threshold to a numeric multiple of the critical density.
///
/// `omega_m` and `a` are only consulted for the virial threshold; their
/// absence there is a validation error.
pub fn critical_overdensity(
    threshold: OverdensityThreshold,
    omega_m: Option<f64>,
    a: Option<f64>,
) -> Result<f64> {
    match threshold {
        OverdensityThreshold::Critical(multiple) => Ok(multiple),
        OverdensityThreshold::Virial => {
            let (Some(omega_m), Some(a)) = (omega_m, a) else {
                return Err(ConvertError::Validation(
                    "resolving the \"vir\" overdensity requires both omega_m and the scale factor a"
                        .to_string(),
                ));
            };
            if !(a.is_finite() && a > 0.0) {
                return Err(ConvertError::Validation(format!(
                    "scale factor a must be strictly positive, got {a}"
                )));
            }
            if !(omega_m.is_finite() && omega_m > 0.0) {
                return Err(ConvertError::Validation(format!(
                    "omega_m must be strictly positive, got {omega_m}"
                )));
            }
            Ok(virial_overdensity(a, omega_m))
        }
    }
}
