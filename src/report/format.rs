//! Result and fit-table formatting.
//!
//! Formatting stays in one place so:
//! - the conversion code stays pure and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{FitRelation, FitTable, ModelVariant, FIT_PIVOT_NAMES};

/// `c_<delta> = <value>` with three decimals.
pub fn format_concentration(delta: &str, c: f64) -> String {
    format!("c_{delta} = {c:.3}")
}

/// `M_<delta> = <value>` in scientific notation.
pub fn format_mass(delta: &str, mass: f64) -> String {
    format!("M_{delta} = {mass:.3e}")
}

/// The `--show-fit-parameters` block for one table: the relation equation,
/// the coefficient values, and the pivot values.
pub fn format_fit_table(
    relation: FitRelation,
    delta: &str,
    delta2: Option<&str>,
    table: &FitTable,
    variant: ModelVariant,
) -> String {
    let mut out = String::new();

    match (relation, delta2) {
        (FitRelation::Mm, Some(to)) => {
            out.push_str(&format!(
                "=== {} relation fit: {delta} -> {to} ===\n",
                relation.display_name()
            ));
            out.push_str("Model: ln(M_delta2) = A + B ln(M_delta1/M_pivot) + C ln(a/a_pivot)\n");
        }
        _ => {
            out.push_str(&format!(
                "=== {} relation fit: {delta} ({}) ===\n",
                relation.display_name(),
                variant.display_name()
            ));
            out.push_str("Model: ln(c_delta) = A + B ln(M_delta/M_pivot) + C ln(a/a_pivot)\n");
        }
    }

    out.push_str("  A = A0 + alpha_m ln(omega_m/p) + alpha_b ln(omega_b/p) + alpha_sigma ln(sigma8/p) + alpha_h ln(h0/p)\n");
    if variant.is_lite() && relation == FitRelation::Mc {
        out.push_str("  B = B0\n");
    } else {
        out.push_str("  B = B0 + beta_m ln(omega_m/p) + beta_b ln(omega_b/p) + beta_sigma ln(sigma8/p) + beta_h ln(h0/p)\n");
    }
    out.push_str("  C = C0 + gamma_m ln(omega_m/p) + gamma_b ln(omega_b/p) + gamma_sigma ln(sigma8/p) + gamma_h ln(h0/p)\n");

    let names = if relation == FitRelation::Mm {
        ModelVariant::Full.parameter_names()
    } else {
        variant.parameter_names()
    };
    out.push_str("Parameters:\n");
    for (name, value) in names.iter().zip(&table.params) {
        out.push_str(&format!("  {name:<12} = {value:>10.3}\n"));
    }

    out.push_str("Pivots:\n");
    for name in FIT_PIVOT_NAMES {
        if let Some(value) = table.pivots.get(name) {
            out.push_str(&format!("  {:<12} = {value}\n", format!("{name}_pivot")));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitDelta;
    use crate::tables;

    #[test]
    fn result_lines_match_published_format() {
        assert_eq!(format_concentration("200c", 5.18523), "c_200c = 5.185");
        let mass_line = format_mass("500c", 2.90247e14);
        assert!(mass_line.starts_with("M_500c = 2.902e14"), "{mass_line}");
    }

    #[test]
    fn fit_table_block_lists_all_parameters() {
        let table = tables::mc_table(ModelVariant::Full, FitDelta::C200);
        let block = format_fit_table(FitRelation::Mc, "200c", None, &table, ModelVariant::Full);
        assert!(block.contains("MC relation fit: 200c (full)"));
        assert!(block.contains("A0"));
        assert!(block.contains("gamma_h"));
        assert!(block.contains("sigma"));
        assert!(block.contains("M_pivot"));
        assert!(block.contains("h0_pivot"));
        assert!(block.contains("beta_m"));
    }

    #[test]
    fn lite_block_fixes_the_mass_slope() {
        let table = tables::mc_table(ModelVariant::Lite, FitDelta::Vir);
        let block = format_fit_table(FitRelation::Mc, "vir", None, &table, ModelVariant::Lite);
        assert!(block.contains("B = B0\n"));
        assert!(!block.contains("beta_m"));
    }

    #[test]
    fn mm_block_names_both_deltas() {
        let table = tables::mm_table(FitDelta::Vir, FitDelta::C200).unwrap();
        let block = format_fit_table(
            FitRelation::Mm,
            "vir",
            Some("200c"),
            &table,
            ModelVariant::Full,
        );
        assert!(block.contains("MM relation fit: vir -> 200c"));
        assert!(block.contains("ln(M_delta2)"));
    }

    #[test]
    fn pivots_absent_from_custom_tables_are_omitted() {
        let table = FitTable::custom();
        let block = format_fit_table(FitRelation::Mc, "200c", None, &table, ModelVariant::Full);
        assert!(!block.contains("M_pivot"));
        assert!(block.contains("Pivots:\n"));
    }
}
