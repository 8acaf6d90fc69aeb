//! Mass conversion between overdensity definitions.
//!
//! `M_delta` scales as `delta * r_delta^3`, and the boundary radius is tied
//! to the concentration, so once the concentration is converted the mass
//! follows from the definitional law
//!
//! ```text
//! M_to = M * (delta_to/delta_from) * (c_to/c_from)^3
//! ```
//!
//! Three entry points differ only in where the source concentration comes
//! from: supplied by the caller, taken from the mass-concentration relation,
//! or bypassed entirely via the direct mass-mass fit.

use crate::domain::{Cosmology, FitDelta, FitTable, HaloState, ModelVariant, OverdensityThreshold};
use crate::error::{ConvertError, Result};
use crate::fit::evaluator;
use crate::math::nfw_shape;
use crate::tables;

use super::concentration::convert_with_profile;
use super::overdensity::critical_overdensity;

fn scale_mass(mass: f64, from: f64, to: f64, c_from: f64, c_to: f64) -> f64 {
    mass * (to / from) * (c_to / c_from).powi(3)
}

/// Convert a mass given its measured concentration at the source threshold.
pub fn mass_from_mass_and_c(
    delta_from: OverdensityThreshold,
    delta_to: OverdensityThreshold,
    mass: f64,
    c_from: f64,
    omega_m: Option<f64>,
    a: Option<f64>,
) -> Result<f64> {
    if !(mass.is_finite() && mass > 0.0) {
        return Err(ConvertError::Validation(format!(
            "mass must be strictly positive, got {mass}"
        )));
    }
    let from = critical_overdensity(delta_from, omega_m, a)?;
    let to = critical_overdensity(delta_to, omega_m, a)?;
    let c_to = convert_with_profile(from, to, c_from, nfw_shape)?;
    Ok(scale_mass(mass, from, to, c_from, c_to))
}

/// Convert a mass using the mass-concentration relation at the source
/// threshold to obtain the concentration.
///
/// The source threshold doubles as the table key, so `200m` is rejected
/// before the conversion starts (it has no critical-density form).
pub fn mass_from_mc_relation(
    delta_from: FitDelta,
    delta_to: OverdensityThreshold,
    variant: ModelVariant,
    halo: &HaloState,
    cosmology: &Cosmology,
    table: Option<&FitTable>,
) -> Result<f64> {
    let from = critical_overdensity(
        delta_from.threshold()?,
        Some(cosmology.omega_m),
        Some(halo.a),
    )?;
    let to = critical_overdensity(delta_to, Some(cosmology.omega_m), Some(halo.a))?;
    let c_from = evaluator::concentration_from_mc_relation(delta_from, variant, halo, cosmology, table)?;
    let c_to = convert_with_profile(from, to, c_from, nfw_shape)?;
    Ok(scale_mass(halo.mass, from, to, c_from, c_to))
}

/// Convert a mass directly through the published mass-mass relation.
pub fn mass_from_mm_relation(
    delta_from: FitDelta,
    delta_to: FitDelta,
    halo: &HaloState,
    cosmology: &Cosmology,
    table: Option<&FitTable>,
) -> Result<f64> {
    let owned;
    let table = match table {
        Some(table) => table,
        None => {
            owned = tables::mm_table(delta_from, delta_to)?;
            &owned
        }
    };
    evaluator::evaluate(table, ModelVariant::Full, halo, cosmology)
}

#[cfg(test)]
mod tests {
    use super::*;

    const C200: OverdensityThreshold = OverdensityThreshold::Critical(200.0);
    const C500: OverdensityThreshold = OverdensityThreshold::Critical(500.0);

    fn cosmology() -> Cosmology {
        Cosmology {
            omega_m: 0.3,
            omega_b: 0.04,
            sigma8: 0.8,
            h0: 0.7,
        }
    }

    #[test]
    fn mass_grows_towards_lower_overdensity() {
        // The 200c boundary encloses the 500c one, so M_200c > M_500c for
        // any positive concentration.
        for &c in &[2.0, 5.0, 10.0] {
            let m = mass_from_mass_and_c(C500, C200, 1e14, c, None, None).unwrap();
            assert!(m > 1e14, "c = {c}: got {m}");
        }
        // And the reverse direction shrinks the mass.
        let m = mass_from_mass_and_c(C200, C500, 1e14, 5.0, None, None).unwrap();
        assert!(m < 1e14, "got {m}");
    }

    #[test]
    fn mass_round_trip_is_close() {
        let m_200 = mass_from_mass_and_c(C500, C200, 1e14, 5.0, None, None).unwrap();
        let c_200 = convert_with_profile(500.0, 200.0, 5.0, nfw_shape).unwrap();
        let m_back = mass_from_mass_and_c(C200, C500, m_200, c_200, None, None).unwrap();
        assert!(((m_back - 1e14) / 1e14).abs() < 0.01, "got {m_back}");
    }

    #[test]
    fn mass_rejects_non_positive_inputs() {
        assert!(matches!(
            mass_from_mass_and_c(C500, C200, 0.0, 5.0, None, None),
            Err(ConvertError::Validation(_))
        ));
        assert!(matches!(
            mass_from_mass_and_c(C500, C200, 1e14, -5.0, None, None),
            Err(ConvertError::Validation(_))
        ));
    }

    #[test]
    fn mc_relation_mass_conversion_is_consistent() {
        // Deriving the concentration from the MC relation and converting the
        // mass by hand must agree with the combined entry point.
        let halo = HaloState { mass: 1e14, a: 1.0 };
        let cosmo = cosmology();
        let m = mass_from_mc_relation(
            FitDelta::C500,
            C200,
            ModelVariant::Full,
            &halo,
            &cosmo,
            None,
        )
        .unwrap();

        let c_500 = evaluator::concentration_from_mc_relation(
            FitDelta::C500,
            ModelVariant::Full,
            &halo,
            &cosmo,
            None,
        )
        .unwrap();
        let by_hand = mass_from_mass_and_c(C500, C200, 1e14, c_500, None, None).unwrap();
        assert_eq!(m.to_bits(), by_hand.to_bits());
        assert!(m > 1e14);
    }

    #[test]
    fn mc_relation_mass_conversion_rejects_mean_density_source() {
        let err = mass_from_mc_relation(
            FitDelta::M200,
            C200,
            ModelVariant::Full,
            &HaloState { mass: 1e14, a: 1.0 },
            &cosmology(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Lookup(_)));
    }

    #[test]
    fn mm_relation_direction_is_physical() {
        // vir (about 101 at z = 0) -> 200c tightens the boundary: the mass
        // drops. The opposite direction raises it.
        let halo = HaloState { mass: 2e14, a: 1.0 };
        let cosmo = cosmology();
        let m_200c = mass_from_mm_relation(FitDelta::Vir, FitDelta::C200, &halo, &cosmo, None).unwrap();
        assert!(m_200c < halo.mass, "got {m_200c}");
        let m_vir = mass_from_mm_relation(FitDelta::C200, FitDelta::Vir, &halo, &cosmo, None).unwrap();
        assert!(m_vir > halo.mass, "got {m_vir}");
    }

    #[test]
    fn mm_relation_rejects_self_pairs() {
        let err = mass_from_mm_relation(
            FitDelta::C200,
            FitDelta::C200,
            &HaloState { mass: 1e14, a: 1.0 },
            &cosmology(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Lookup(_)));
    }
}
