//! Command-line surface of the converter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! conversion code. Selectors are independent boolean flags — several can
//! run in one invocation — matching the published interface of the tool.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{ConvertError, Result};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "halomc",
    version,
    about = "Halo mass and concentration converter for hydrodynamic-simulation fits"
)]
pub struct Cli {
    /// Source overdensity (200c, 500c, 2500c, vir; 200m for relation lookups only).
    #[arg(long = "delta1", visible_alias = "delta", value_name = "DELTA")]
    pub delta1: Option<String>,

    /// Destination overdensity for mass-mass or concentration-concentration conversions.
    #[arg(long, value_name = "DELTA")]
    pub delta2: Option<String>,

    /// Halo mass to convert [Msun/h].
    #[arg(long = "M", value_name = "MASS")]
    pub mass: Option<f64>,

    /// Scale factor of the halo (a = 1 today).
    #[arg(long)]
    pub a: Option<f64>,

    /// Omega_m of the conversion cosmology.
    #[arg(long = "omega-m")]
    pub omega_m: Option<f64>,

    /// Omega_b of the conversion cosmology.
    #[arg(long = "omega-b")]
    pub omega_b: Option<f64>,

    /// sigma8 of the conversion cosmology.
    #[arg(long)]
    pub sigma8: Option<f64>,

    /// h0 of the conversion cosmology.
    #[arg(long)]
    pub h0: Option<f64>,

    /// Concentration at --delta1 (with --concentration-from-c and --mass-from-mass-and-c).
    #[arg(long)]
    pub c: Option<f64>,

    /// Concentration at --delta1 from the mass-concentration relation.
    #[arg(long)]
    pub concentration_from_mc_relation: bool,

    /// Concentration at --delta2 given the concentration --c at --delta1.
    #[arg(long)]
    pub concentration_from_c: bool,

    /// Mass at --delta2 from the mass-concentration relation at --delta1.
    #[arg(long)]
    pub mass_from_mc_relation: bool,

    /// Mass at --delta2 from the direct mass-mass relation at --delta1.
    #[arg(long)]
    pub mass_from_mm_relation: bool,

    /// Mass at --delta2 given a mass and concentration (--c) at --delta1.
    #[arg(long)]
    pub mass_from_mass_and_c: bool,

    /// Print the fit coefficients and pivots in use.
    #[arg(long)]
    pub show_fit_parameters: bool,

    /// Use the parametrisation with the mass slope fixed at B0.
    #[arg(long)]
    pub use_lite_mc_fit: bool,

    /// Lite parametrisation with the scale radius from the dark-matter
    /// profile (requires --use-lite-mc-fit).
    #[arg(long)]
    pub use_lite_mc_dm_fit: bool,

    /// Use the closed-form Hu & Kratsov (2002) concentration conversion.
    #[arg(long)]
    pub concentration_hu_kratsov_2002: bool,

    /// Override pivot values, e.g. --set-pivots M=1e14 a=0.7
    #[arg(long = "set-pivots", value_name = "KEY=VAL", num_args = 1..)]
    pub set_pivots: Vec<String>,

    /// Override fit coefficients, e.g. --set-fit-parameters A0=3.2 gamma_m=-0.01
    #[arg(long = "set-fit-parameters", value_name = "KEY=VAL", num_args = 1..)]
    pub set_fit_parameters: Vec<String>,

    /// Load a fit table from a JSON file instead of the published tables.
    #[arg(long = "fit-table", value_name = "JSON")]
    pub fit_table: Option<PathBuf>,

    /// Export the selected fit table as JSON.
    #[arg(long = "export-fit-table", value_name = "JSON")]
    pub export_fit_table: Option<PathBuf>,

    /// Show full error detail instead of a one-line message.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Whether any conversion selector was requested.
    pub fn any_selector(&self) -> bool {
        self.concentration_from_mc_relation
            || self.concentration_from_c
            || self.mass_from_mc_relation
            || self.mass_from_mm_relation
            || self.mass_from_mass_and_c
            || self.show_fit_parameters
    }

    /// Whether any selector that evaluates a fit table was requested.
    pub fn any_relation_selector(&self) -> bool {
        self.concentration_from_mc_relation
            || self.mass_from_mc_relation
            || self.mass_from_mm_relation
    }

    /// Whether the invocation customises the fit table.
    pub fn customises_table(&self) -> bool {
        !self.set_pivots.is_empty() || !self.set_fit_parameters.is_empty() || self.fit_table.is_some()
    }
}

/// Parse `KEY=VAL` override arguments against an allowed key set.
///
/// `what` names the flag in error messages.
pub fn parse_overrides(args: &[String], allowed: &[&str], what: &str) -> Result<Vec<(String, f64)>> {
    args.iter()
        .map(|arg| {
            let Some((key, value)) = arg.split_once('=') else {
                return Err(ConvertError::Validation(format!(
                    "{what} entries must be KEY=VAL, found \"{arg}\""
                )));
            };
            if !allowed.contains(&key) {
                return Err(ConvertError::Validation(format!(
                    "\"{key}\" is not a valid {what} key; expected one of {}",
                    allowed.join(", ")
                )));
            }
            let parsed: f64 = value.parse().map_err(|_| {
                ConvertError::Validation(format!(
                    "{what} value for \"{key}\" must be a float, found \"{value}\""
                ))
            })?;
            Ok((key.to_string(), parsed))
        })
        .collect()
}
