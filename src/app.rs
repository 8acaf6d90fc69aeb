//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - validates flag combinations and marshals parameters
//! - selects or builds the fit table
//! - runs the requested conversions and prints results
//!
//! Several selectors may be active in one invocation; they run in a fixed
//! order and each prints one result line. Any failure stops the run with a
//! single diagnostic on stderr (full detail with `--debug`) and exit code 1.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use crate::cli::{self, Cli};
use crate::convert;
use crate::domain::{
    ConversionMethod, Cosmology, FitDelta, FitRelation, FitTable, HaloState, ModelVariant,
    OverdensityThreshold, FIT_PARAMETER_NAMES, FIT_PIVOT_NAMES,
};
use crate::error::{ConvertError, Result};
use crate::fit;
use crate::io::{self, TableFile};
use crate::report;
use crate::tables;

/// Entry point for the `halomc` binary.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.debug {
                eprintln!("{err:?}");
            } else {
                eprintln!("{err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> Result<()> {
    if !cli.any_selector() && !cli.customises_table() && cli.export_fit_table.is_none() {
        Cli::command()
            .print_help()
            .map_err(|e| ConvertError::Io(e.to_string()))?;
        println!();
        return Ok(());
    }

    let variant = ModelVariant::from_flags(cli.use_lite_mc_fit, cli.use_lite_mc_dm_fit)?;
    let method = if cli.concentration_hu_kratsov_2002 {
        ConversionMethod::HuKratsov2002
    } else {
        ConversionMethod::FixedPoint
    };

    let has_overrides = !cli.set_pivots.is_empty() || !cli.set_fit_parameters.is_empty();
    if has_overrides && variant.is_lite() {
        return Err(ConvertError::Validation(
            "--set-fit-parameters and --set-pivots build a full-parametrisation table; \
             they cannot be combined with --use-lite-mc-fit"
                .to_string(),
        ));
    }
    let custom = custom_table(cli)?;
    if custom.is_some()
        && !cli.any_relation_selector()
        && !cli.show_fit_parameters
        && cli.export_fit_table.is_none()
    {
        return Err(ConvertError::Validation(
            "a custom fit table only applies to --concentration-from-mc-relation, \
             --mass-from-mc-relation or --mass-from-mm-relation"
                .to_string(),
        ));
    }

    if cli.show_fit_parameters {
        print!("{}", show_tables(cli, variant, custom.as_ref())?);
    }
    if let Some(path) = &cli.export_fit_table {
        let table_file = export_selection(cli, variant, custom.as_ref())?;
        io::write_table_json(path, &table_file)?;
    }

    if cli.concentration_from_mc_relation {
        let delta = FitDelta::parse(require_str(&cli.delta1, "--delta1")?)?;
        let c = fit::concentration_from_mc_relation(
            delta,
            variant,
            &halo(cli)?,
            &cosmology(cli)?,
            custom.as_ref(),
        )?;
        println!("{}", report::format_concentration(delta.label(), c));
    }

    if cli.concentration_from_c {
        let from = OverdensityThreshold::parse(require_str(&cli.delta1, "--delta1")?)?;
        let delta2 = require_str(&cli.delta2, "--delta2")?;
        let to = OverdensityThreshold::parse(delta2)?;
        let c_from = require(cli.c, "--c")?;
        let c = convert::convert_concentration(from, to, c_from, method, cli.omega_m, cli.a)?;
        println!("{}", report::format_concentration(delta2, c));
    }

    if cli.mass_from_mm_relation {
        let from = FitDelta::parse(require_str(&cli.delta1, "--delta1")?)?;
        let delta2 = require_str(&cli.delta2, "--delta2")?;
        let to = FitDelta::parse(delta2)?;
        let mass = convert::mass_from_mm_relation(
            from,
            to,
            &halo(cli)?,
            &cosmology(cli)?,
            custom.as_ref(),
        )?;
        println!("{}", report::format_mass(delta2, mass));
    }

    if cli.mass_from_mc_relation {
        let from = FitDelta::parse(require_str(&cli.delta1, "--delta1")?)?;
        let delta2 = require_str(&cli.delta2, "--delta2")?;
        let to = OverdensityThreshold::parse(delta2)?;
        let mass = convert::mass_from_mc_relation(
            from,
            to,
            variant,
            &halo(cli)?,
            &cosmology(cli)?,
            custom.as_ref(),
        )?;
        println!("{}", report::format_mass(delta2, mass));
    }

    if cli.mass_from_mass_and_c {
        let from = OverdensityThreshold::parse(require_str(&cli.delta1, "--delta1")?)?;
        let delta2 = require_str(&cli.delta2, "--delta2")?;
        let to = OverdensityThreshold::parse(delta2)?;
        let mass = convert::mass_from_mass_and_c(
            from,
            to,
            require(cli.mass, "--M")?,
            require(cli.c, "--c")?,
            cli.omega_m,
            cli.a,
        )?;
        println!("{}", report::format_mass(delta2, mass));
    }

    Ok(())
}

/// Build the custom fit table from `--fit-table` or the override flags.
fn custom_table(cli: &Cli) -> Result<Option<FitTable>> {
    let has_overrides = !cli.set_pivots.is_empty() || !cli.set_fit_parameters.is_empty();
    if let Some(path) = &cli.fit_table {
        if has_overrides {
            return Err(ConvertError::Validation(
                "--fit-table cannot be combined with --set-fit-parameters or --set-pivots"
                    .to_string(),
            ));
        }
        return Ok(Some(io::read_table_json(path)?.table));
    }
    if !has_overrides {
        return Ok(None);
    }

    // Overrides build a fresh full-arity table: coefficients default to
    // zero, pivots default to absent (their log-ratio terms drop out).
    let mut table = FitTable::custom();
    for (key, value) in cli::parse_overrides(
        &cli.set_fit_parameters,
        &FIT_PARAMETER_NAMES,
        "--set-fit-parameters",
    )? {
        table.set_param(&key, value)?;
    }
    for (key, value) in cli::parse_overrides(&cli.set_pivots, &FIT_PIVOT_NAMES, "--set-pivots")? {
        table.pivots.set(&key, value)?;
    }
    Ok(Some(table))
}

/// Variant matching a table's arity, for labelling custom tables.
fn variant_for(table: &FitTable) -> ModelVariant {
    if table.params.len() == ModelVariant::Lite.param_len() {
        ModelVariant::Lite
    } else {
        ModelVariant::Full
    }
}

/// Assemble the `--show-fit-parameters` output.
///
/// With a custom table, that table is shown. Otherwise: the MM table when
/// `--mass-from-mm-relation` is active, the MC table for `--delta1` when
/// given, and all five MC tables when no overdensity is named.
fn show_tables(cli: &Cli, variant: ModelVariant, custom: Option<&FitTable>) -> Result<String> {
    if let Some(table) = custom {
        let delta = cli.delta1.as_deref().unwrap_or("custom");
        let relation = if cli.mass_from_mm_relation {
            FitRelation::Mm
        } else {
            FitRelation::Mc
        };
        return Ok(report::format_fit_table(
            relation,
            delta,
            cli.delta2.as_deref(),
            table,
            variant_for(table),
        ));
    }

    if cli.mass_from_mm_relation {
        let from = FitDelta::parse(require_str(&cli.delta1, "--delta1")?)?;
        let to = FitDelta::parse(require_str(&cli.delta2, "--delta2")?)?;
        let table = tables::mm_table(from, to)?;
        return Ok(report::format_fit_table(
            FitRelation::Mm,
            from.label(),
            Some(to.label()),
            &table,
            ModelVariant::Full,
        ));
    }

    if let Some(delta1) = cli.delta1.as_deref() {
        let delta = FitDelta::parse(delta1)?;
        let table = tables::mc_table(variant, delta);
        return Ok(report::format_fit_table(
            FitRelation::Mc,
            delta.label(),
            None,
            &table,
            variant,
        ));
    }

    let mut out = String::new();
    for delta in FitDelta::ALL {
        let table = tables::mc_table(variant, delta);
        out.push_str(&report::format_fit_table(
            FitRelation::Mc,
            delta.label(),
            None,
            &table,
            variant,
        ));
        out.push('\n');
    }
    Ok(out)
}

/// Pick the table that `--export-fit-table` writes.
fn export_selection(cli: &Cli, variant: ModelVariant, custom: Option<&FitTable>) -> Result<TableFile> {
    if let Some(table) = custom {
        let relation = if cli.mass_from_mm_relation {
            FitRelation::Mm
        } else {
            FitRelation::Mc
        };
        return Ok(TableFile {
            tool: "halomc".to_string(),
            relation,
            variant: variant_for(table).display_name().to_string(),
            delta: cli.delta1.clone().unwrap_or_else(|| "custom".to_string()),
            delta2: cli.delta2.clone(),
            table: table.clone(),
        });
    }

    if cli.mass_from_mm_relation {
        let from = FitDelta::parse(require_str(&cli.delta1, "--delta1")?)?;
        let to = FitDelta::parse(require_str(&cli.delta2, "--delta2")?)?;
        return Ok(TableFile {
            tool: "halomc".to_string(),
            relation: FitRelation::Mm,
            variant: ModelVariant::Full.display_name().to_string(),
            delta: from.label().to_string(),
            delta2: Some(to.label().to_string()),
            table: tables::mm_table(from, to)?,
        });
    }

    let delta = FitDelta::parse(require_str(&cli.delta1, "--delta1")?)?;
    Ok(TableFile {
        tool: "halomc".to_string(),
        relation: FitRelation::Mc,
        variant: variant.display_name().to_string(),
        delta: delta.label().to_string(),
        delta2: None,
        table: tables::mc_table(variant, delta),
    })
}

fn require<T: Copy>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| ConvertError::Validation(format!("missing required {flag}")))
}

fn require_str<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ConvertError::Validation(format!("missing required {flag}")))
}

/// Marshal the four cosmology flags; absence of any is a validation error.
fn cosmology(cli: &Cli) -> Result<Cosmology> {
    Ok(Cosmology {
        omega_m: require(cli.omega_m, "--omega-m")?,
        omega_b: require(cli.omega_b, "--omega-b")?,
        sigma8: require(cli.sigma8, "--sigma8")?,
        h0: require(cli.h0, "--h0")?,
    })
}

fn halo(cli: &Cli) -> Result<HaloState> {
    Ok(HaloState {
        mass: require(cli.mass, "--M")?,
        a: require(cli.a, "--a")?,
    })
}
