//! Log-linear fit evaluation.
//!
//! The model (Eq. 8 of Ragagnin et al. 2020) is
//!
//! ```text
//! ln(y) = A + B ln(M/M_pivot) + C ln(a/a_pivot)
//! ```
//!
//! where `A`, `B` and `C` are themselves log-linear in the cosmological
//! parameters around the table's pivots:
//!
//! ```text
//! A = A0 + alpha_m ln(omega_m/p) + alpha_b ln(omega_b/p)
//!        + alpha_sigma ln(sigma8/p) + alpha_h ln(h0/p)
//! B = B0 + beta_* ...   (lite parametrisation: B = B0)
//! C = C0 + gamma_* ...
//! ```
//!
//! The same formula serves the mass-concentration relation (`y` is a
//! concentration) and the mass-mass relation (`y` is the mass at the target
//! overdensity). A pivot absent from the table drops its term.

use rayon::prelude::*;

use crate::domain::{Cosmology, FitDelta, FitTable, HaloState, ModelVariant};
use crate::error::{ConvertError, Result};
use crate::tables;

/// `ln(value / pivot)`, or 0 when the table has no such pivot.
fn log_ratio(name: &str, value: f64, pivot: Option<f64>) -> Result<f64> {
    let Some(pivot) = pivot else {
        return Ok(0.0);
    };
    if !(pivot.is_finite() && pivot > 0.0) {
        return Err(ConvertError::Validation(format!(
            "pivot \"{name}\" must be strictly positive, got {pivot}"
        )));
    }
    if !(value.is_finite() && value > 0.0) {
        return Err(ConvertError::Validation(format!(
            "\"{name}\" must be strictly positive, got {value}"
        )));
    }
    Ok((value / pivot).ln())
}

/// Evaluate a fit table at the given halo and cosmology.
///
/// Pure function of its inputs; the table is read-only.
pub fn evaluate(
    table: &FitTable,
    variant: ModelVariant,
    halo: &HaloState,
    cosmology: &Cosmology,
) -> Result<f64> {
    let p = &table.params;
    if p.len() != variant.param_len() {
        return Err(ConvertError::Validation(format!(
            "fit table has {} coefficients but the {} parametrisation needs {}",
            p.len(),
            variant.display_name(),
            variant.param_len()
        )));
    }

    let lr_mass = log_ratio("M", halo.mass, table.pivots.mass)?;
    let lr_a = log_ratio("a", halo.a, table.pivots.a)?;
    let lr_om = log_ratio("omega_m", cosmology.omega_m, table.pivots.omega_m)?;
    let lr_ob = log_ratio("omega_b", cosmology.omega_b, table.pivots.omega_b)?;
    let lr_s8 = log_ratio("sigma8", cosmology.sigma8, table.pivots.sigma8)?;
    let lr_h0 = log_ratio("h0", cosmology.h0, table.pivots.h0)?;

    let a_term = p[0] + p[3] * lr_om + p[4] * lr_ob + p[5] * lr_s8 + p[6] * lr_h0;
    let (b_term, c_term) = if variant.is_lite() {
        let c = p[2] + p[7] * lr_om + p[8] * lr_ob + p[9] * lr_s8 + p[10] * lr_h0;
        (p[1], c)
    } else {
        let b = p[1] + p[7] * lr_om + p[8] * lr_ob + p[9] * lr_s8 + p[10] * lr_h0;
        let c = p[2] + p[11] * lr_om + p[12] * lr_ob + p[13] * lr_s8 + p[14] * lr_h0;
        (b, c)
    };

    Ok((a_term + b_term * lr_mass + c_term * lr_a).exp())
}

/// Concentration at `delta` from the published mass-concentration relation
/// (or a caller-supplied table).
pub fn concentration_from_mc_relation(
    delta: FitDelta,
    variant: ModelVariant,
    halo: &HaloState,
    cosmology: &Cosmology,
    table: Option<&FitTable>,
) -> Result<f64> {
    match table {
        Some(table) => evaluate(table, variant, halo, cosmology),
        None => evaluate(&tables::mc_table(variant, delta), variant, halo, cosmology),
    }
}

/// Batch form of [`concentration_from_mc_relation`] over many halo masses at
/// a shared scale factor.
///
/// Every evaluation is independent, so the batch fans out across threads.
pub fn concentrations_from_mc_relation(
    delta: FitDelta,
    variant: ModelVariant,
    masses: &[f64],
    a: f64,
    cosmology: &Cosmology,
    table: Option<&FitTable>,
) -> Result<Vec<f64>> {
    let owned;
    let table = match table {
        Some(table) => table,
        None => {
            owned = tables::mc_table(variant, delta);
            &owned
        }
    };
    masses
        .par_iter()
        .map(|&mass| evaluate(table, variant, &HaloState { mass, a }, cosmology))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pivots;

    fn pivot_cosmology(pivots: &Pivots) -> Cosmology {
        Cosmology {
            omega_m: pivots.omega_m.unwrap(),
            omega_b: pivots.omega_b.unwrap(),
            sigma8: pivots.sigma8.unwrap(),
            h0: pivots.h0.unwrap(),
        }
    }

    #[test]
    fn evaluate_at_pivots_returns_exp_a0() {
        // Every log-ratio term vanishes at the pivot point.
        for delta in FitDelta::ALL {
            for variant in [ModelVariant::Full, ModelVariant::Lite, ModelVariant::LiteDm] {
                let table = tables::mc_table(variant, delta);
                let halo = HaloState {
                    mass: table.pivots.mass.unwrap(),
                    a: table.pivots.a.unwrap(),
                };
                let cosmology = pivot_cosmology(&table.pivots);
                let c = evaluate(&table, variant, &halo, &cosmology).unwrap();
                assert_eq!(c, table.params[0].exp(), "{delta}");
            }
        }
    }

    #[test]
    fn evaluate_mm_at_pivots_returns_exp_a0() {
        let table = tables::mm_table(FitDelta::Vir, FitDelta::C200).unwrap();
        let halo = HaloState {
            mass: table.pivots.mass.unwrap(),
            a: table.pivots.a.unwrap(),
        };
        let cosmology = pivot_cosmology(&table.pivots);
        let mass = evaluate(&table, ModelVariant::Full, &halo, &cosmology).unwrap();
        assert_eq!(mass, table.params[0].exp());
        // exp(A0) for vir->200c sits around 1.6e14 Msun: the 200c mass of a
        // pivot-mass halo is below its virial mass.
        assert!(mass < table.pivots.mass.unwrap());
        assert!(mass > 1e14);
    }

    #[test]
    fn lite_mass_slope_is_cosmology_independent() {
        // In the lite parametrisation B = B0, so off-pivot cosmology shifts
        // only the normalisation and the scale-factor slope.
        let table = tables::mc_table(ModelVariant::Lite, FitDelta::C200);
        let halo = HaloState {
            mass: 2.0 * table.pivots.mass.unwrap(),
            a: table.pivots.a.unwrap(),
        };
        let pivot_cosmo = pivot_cosmology(&table.pivots);
        let shifted = Cosmology {
            omega_m: pivot_cosmo.omega_m * 1.2,
            ..pivot_cosmo
        };

        let base = evaluate(&table, ModelVariant::Lite, &halo, &pivot_cosmo).unwrap();
        let moved = evaluate(&table, ModelVariant::Lite, &halo, &shifted).unwrap();

        // ratio in ln-space: (A' - A) is independent of mass when B is fixed
        let halo_pivot = HaloState {
            mass: table.pivots.mass.unwrap(),
            a: halo.a,
        };
        let base_pivot = evaluate(&table, ModelVariant::Lite, &halo_pivot, &pivot_cosmo).unwrap();
        let moved_pivot = evaluate(&table, ModelVariant::Lite, &halo_pivot, &shifted).unwrap();
        assert!(((moved / base).ln() - (moved_pivot / base_pivot).ln()).abs() < 1e-12);
    }

    #[test]
    fn missing_pivots_drop_terms() {
        // A custom table with only A0 set and no pivots is a constant fit.
        let mut table = FitTable::custom();
        table.set_param("A0", 1.5).unwrap();
        table.set_param("B0", 2.0).unwrap();
        let cosmology = Cosmology {
            omega_m: 0.3,
            omega_b: 0.04,
            sigma8: 0.8,
            h0: 0.7,
        };
        let c1 = evaluate(
            &table,
            ModelVariant::Full,
            &HaloState { mass: 1e13, a: 0.5 },
            &cosmology,
        )
        .unwrap();
        let c2 = evaluate(
            &table,
            ModelVariant::Full,
            &HaloState { mass: 1e15, a: 1.0 },
            &cosmology,
        )
        .unwrap();
        assert_eq!(c1, 1.5f64.exp());
        assert_eq!(c1, c2);
    }

    #[test]
    fn evaluate_is_deterministic() {
        let table = tables::mc_table(ModelVariant::Full, FitDelta::C200);
        let halo = HaloState { mass: 1e14, a: 0.9 };
        let cosmology = Cosmology {
            omega_m: 0.2,
            omega_b: 0.04,
            sigma8: 0.7,
            h0: 0.7,
        };
        let first = evaluate(&table, ModelVariant::Full, &halo, &cosmology).unwrap();
        for _ in 0..10 {
            let again = evaluate(&table, ModelVariant::Full, &halo, &cosmology).unwrap();
            assert_eq!(first.to_bits(), again.to_bits());
        }
        // A plausible concentration for a 1e14 halo.
        assert!(first > 1.0 && first < 20.0);
    }

    #[test]
    fn evaluate_rejects_non_positive_ratio_arguments() {
        let table = tables::mc_table(ModelVariant::Full, FitDelta::C200);
        let cosmology = Cosmology {
            omega_m: 0.3,
            omega_b: 0.04,
            sigma8: 0.8,
            h0: 0.7,
        };
        let err = evaluate(
            &table,
            ModelVariant::Full,
            &HaloState { mass: -1e14, a: 0.9 },
            &cosmology,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));

        let bad_cosmo = Cosmology {
            omega_m: 0.0,
            ..cosmology
        };
        let err = evaluate(
            &table,
            ModelVariant::Full,
            &HaloState { mass: 1e14, a: 0.9 },
            &bad_cosmo,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
    }

    #[test]
    fn evaluate_rejects_arity_mismatch() {
        let table = tables::mc_table(ModelVariant::Full, FitDelta::C200);
        let cosmology = Cosmology {
            omega_m: 0.3,
            omega_b: 0.04,
            sigma8: 0.8,
            h0: 0.7,
        };
        let err = evaluate(
            &table,
            ModelVariant::Lite,
            &HaloState { mass: 1e14, a: 0.9 },
            &cosmology,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
    }

    #[test]
    fn batch_matches_scalar() {
        let masses = [1e13, 5e13, 1e14, 5e14, 1e15];
        let cosmology = Cosmology {
            omega_m: 0.3,
            omega_b: 0.04,
            sigma8: 0.8,
            h0: 0.7,
        };
        let batch = concentrations_from_mc_relation(
            FitDelta::C200,
            ModelVariant::Full,
            &masses,
            0.9,
            &cosmology,
            None,
        )
        .unwrap();
        assert_eq!(batch.len(), masses.len());
        for (&mass, &c) in masses.iter().zip(&batch) {
            let scalar = concentration_from_mc_relation(
                FitDelta::C200,
                ModelVariant::Full,
                &HaloState { mass, a: 0.9 },
                &cosmology,
                None,
            )
            .unwrap();
            assert_eq!(c.to_bits(), scalar.to_bits());
        }
    }
}
