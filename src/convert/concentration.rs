//! Concentration conversion between overdensity thresholds.
//!
//! Two thresholds describe the same halo at two radii, which ties the two
//! concentrations together through the enclosed-mass shape of the profile:
//!
//! ```text
//! c2 = c1 * ( (delta1/delta2) * mu(c2)/mu(c1) )^(1/3)
//! ```
//!
//! The default method solves this implicit relation by bounded fixed-point
//! iteration; the alternative is the closed-form Hu & Kratsov (2002)
//! approximation, which is anchored at the virial threshold and bypasses the
//! profile shape entirely.

use rayon::prelude::*;

use crate::domain::{ConversionMethod, OverdensityThreshold};
use crate::error::{ConvertError, Result};
use crate::math::{fixed_point, nfw_shape};

use super::overdensity::critical_overdensity;

/// Hu & Kratsov (2002) appendix constants.
const HK_A1: f64 = 0.5116;
const HK_A2: f64 = -0.4283;
const HK_A3: f64 = -3.13e-3;
const HK_A4: f64 = -3.52e-5;

/// Convert `c_from` at `delta_from` into the equivalent concentration at
/// `delta_to`, iterating on an arbitrary profile shape.
///
/// Both deltas are numeric multiples of the critical density (already
/// resolved). `shape` must be strictly increasing with `shape(0) = 0`.
pub fn convert_with_profile<F>(delta_from: f64, delta_to: f64, c_from: f64, shape: F) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if !(c_from.is_finite() && c_from > 0.0) {
        return Err(ConvertError::Validation(format!(
            "concentration must be strictly positive, got {c_from}"
        )));
    }
    let mu_from = shape(c_from);
    let ratio = delta_from / delta_to;
    fixed_point::solve(
        |c2| c_from * (ratio * shape(c2) / mu_from).cbrt(),
        c_from,
        fixed_point::DEFAULT_TOLERANCE,
        fixed_point::MAX_ITERATIONS,
    )
}

/// Closed-form Hu & Kratsov (2002, appendix) conversion.
///
/// Valid for conversions anchored at the virial threshold: `delta_from` is
/// the (resolved) virial overdensity and `c_from` the virial concentration.
pub fn hu_kratsov_2002(delta_from: f64, delta_to: f64, c_from: f64) -> Result<f64> {
    if !(c_from.is_finite() && c_from > 0.0) {
        return Err(ConvertError::Validation(format!(
            "concentration must be strictly positive, got {c_from}"
        )));
    }
    let f = delta_to / delta_from * hk_shape(1.0 / c_from);
    let ln_f = f.ln();
    let p = HK_A2 + HK_A3 * ln_f + HK_A4 * ln_f * ln_f;
    let x = 1.0 / (HK_A1 * f.powf(2.0 * p) + 0.5625).sqrt() + 2.0 * f;
    Ok(1.0 / x)
}

/// `x^3 (ln(1 + 1/x) - 1/(1 + x))`: the NFW shape in `x = rs/r`.
fn hk_shape(x: f64) -> f64 {
    x * x * x * ((1.0 + 1.0 / x).ln() - 1.0 / (1.0 + x))
}

/// Convert a concentration between two named thresholds.
///
/// `omega_m` and `a` are only needed when one of the endpoints is `vir`.
pub fn convert_concentration(
    delta_from: OverdensityThreshold,
    delta_to: OverdensityThreshold,
    c_from: f64,
    method: ConversionMethod,
    omega_m: Option<f64>,
    a: Option<f64>,
) -> Result<f64> {
    let from = critical_overdensity(delta_from, omega_m, a)?;
    let to = critical_overdensity(delta_to, omega_m, a)?;
    match method {
        ConversionMethod::FixedPoint => convert_with_profile(from, to, c_from, nfw_shape),
        ConversionMethod::HuKratsov2002 => hu_kratsov_2002(from, to, c_from),
    }
}

/// Batch form of [`convert_concentration`]: one shared threshold pair, many
/// haloes. Each conversion is independent, so the batch fans out across
/// threads.
pub fn convert_concentration_batch(
    delta_from: OverdensityThreshold,
    delta_to: OverdensityThreshold,
    concentrations: &[f64],
    method: ConversionMethod,
    omega_m: Option<f64>,
    a: Option<f64>,
) -> Result<Vec<f64>> {
    let from = critical_overdensity(delta_from, omega_m, a)?;
    let to = critical_overdensity(delta_to, omega_m, a)?;
    concentrations
        .par_iter()
        .map(|&c| match method {
            ConversionMethod::FixedPoint => convert_with_profile(from, to, c, nfw_shape),
            ConversionMethod::HuKratsov2002 => hu_kratsov_2002(from, to, c),
        })
        .collect()
}
