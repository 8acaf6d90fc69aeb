//! Shared domain types.
//!
//! These types are intentionally lightweight and (where portable)
//! serializable so they can be:
//!
//! - used in-memory during conversions
//! - exported to JSON fit-table files
//! - reloaded later as user-supplied tables

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Coefficient names of the full parametrisation, in table order.
///
/// The trailing `sigma` is the log-space scatter of the fit; it is reported
/// by `--show-fit-parameters` but plays no role in evaluation.
pub const FIT_PARAMETER_NAMES: [&str; 16] = [
    "A0",
    "B0",
    "C0",
    "alpha_m",
    "alpha_b",
    "alpha_sigma",
    "alpha_h",
    "beta_m",
    "beta_b",
    "beta_sigma",
    "beta_h",
    "gamma_m",
    "gamma_b",
    "gamma_sigma",
    "gamma_h",
    "sigma",
];

/// Coefficient names of the lite parametrisation (mass slope fixed at `B0`).
pub const FIT_PARAMETER_LITE_NAMES: [&str; 12] = [
    "A0",
    "B0",
    "C0",
    "alpha_m",
    "alpha_b",
    "alpha_sigma",
    "alpha_h",
    "gamma_m",
    "gamma_b",
    "gamma_sigma",
    "gamma_h",
    "sigma",
];

/// Pivot names a fit may be centred on.
pub const FIT_PIVOT_NAMES: [&str; 6] = ["M", "a", "omega_m", "omega_b", "sigma8", "h0"];

/// Cosmological parameters of a conversion.
///
/// All fields are required and strictly positive; there are no defaults.
/// Absence of a parameter is a validation error at the call boundary, not a
/// silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cosmology {
    pub omega_m: f64,
    pub omega_b: f64,
    pub sigma8: f64,
    pub h0: f64,
}

/// Halo mass and scale factor at a given overdensity threshold.
///
/// A per-call parameter bundle: created for one conversion, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaloState {
    /// Halo mass at the source threshold.
    pub mass: f64,
    /// Scale factor (`a = 1` today).
    pub a: f64,
}

/// Which parametrisation of the mass-concentration fit to use.
///
/// `LiteDm` (scale radius from the dark-matter profile) only exists in the
/// lite parametrisation, so selecting it implies lite semantics by
/// construction; the invalid flag combination is rejected in `from_flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    Full,
    Lite,
    LiteDm,
}

impl ModelVariant {
    /// Resolve the two CLI booleans into a variant.
    pub fn from_flags(lite: bool, dm_lite: bool) -> Result<Self> {
        match (lite, dm_lite) {
            (false, false) => Ok(ModelVariant::Full),
            (true, false) => Ok(ModelVariant::Lite),
            (true, true) => Ok(ModelVariant::LiteDm),
            (false, true) => Err(ConvertError::Validation(
                "--use-lite-mc-dm-fit requires --use-lite-mc-fit".to_string(),
            )),
        }
    }

    /// Number of coefficients a table of this variant carries.
    pub fn param_len(self) -> usize {
        match self {
            ModelVariant::Full => 16,
            ModelVariant::Lite | ModelVariant::LiteDm => 12,
        }
    }

    /// Whether the mass slope is fixed at `B0`.
    pub fn is_lite(self) -> bool {
        !matches!(self, ModelVariant::Full)
    }

    /// Coefficient names in table order for this variant.
    pub fn parameter_names(self) -> &'static [&'static str] {
        if self.is_lite() {
            &FIT_PARAMETER_LITE_NAMES
        } else {
            &FIT_PARAMETER_NAMES
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelVariant::Full => "full",
            ModelVariant::Lite => "lite",
            ModelVariant::LiteDm => "dm-lite",
        }
    }
}

/// Which fitted relation a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitRelation {
    /// Mass-concentration relation: the result is a concentration.
    Mc,
    /// Mass-mass relation: the result is the mass at the target threshold.
    Mm,
}

impl FitRelation {
    pub fn display_name(self) -> &'static str {
        match self {
            FitRelation::Mc => "MC",
            FitRelation::Mm => "MM",
        }
    }
}

/// How to convert a concentration between overdensity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMethod {
    /// Fixed-point iteration on the profile shape function.
    #[default]
    FixedPoint,
    /// Closed-form Hu & Kratsov (2002) approximation, anchored at the
    /// virial threshold.
    HuKratsov2002,
}

/// Overdensity identifiers with published fit tables.
///
/// `M200` (the mean-density identifier `200m`) is a valid table key for the
/// MC/MM relations but has no critical-density equivalent; see
/// [`FitDelta::threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitDelta {
    Vir,
    C200,
    C500,
    C2500,
    M200,
}

impl FitDelta {
    pub const ALL: [FitDelta; 5] = [
        FitDelta::C200,
        FitDelta::C500,
        FitDelta::C2500,
        FitDelta::Vir,
        FitDelta::M200,
    ];

    /// Parse a table key (`200c`, `500c`, `2500c`, `vir`, `200m`).
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "vir" => Ok(FitDelta::Vir),
            "200c" => Ok(FitDelta::C200),
            "500c" => Ok(FitDelta::C500),
            "2500c" => Ok(FitDelta::C2500),
            "200m" => Ok(FitDelta::M200),
            other => Err(ConvertError::Lookup(format!(
                "no fit tables for overdensity \"{other}\"; expected one of 200c, 500c, 2500c, vir, 200m"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FitDelta::Vir => "vir",
            FitDelta::C200 => "200c",
            FitDelta::C500 => "500c",
            FitDelta::C2500 => "2500c",
            FitDelta::M200 => "200m",
        }
    }

    /// The critical-density threshold this identifier corresponds to.
    ///
    /// `200m` is defined against the mean density and cannot enter a
    /// threshold conversion, so it has no threshold form.
    pub fn threshold(self) -> Result<OverdensityThreshold> {
        match self {
            FitDelta::Vir => Ok(OverdensityThreshold::Virial),
            FitDelta::C200 => Ok(OverdensityThreshold::Critical(200.0)),
            FitDelta::C500 => Ok(OverdensityThreshold::Critical(500.0)),
            FitDelta::C2500 => Ok(OverdensityThreshold::Critical(2500.0)),
            FitDelta::M200 => Err(ConvertError::Lookup(
                "\"200m\" is a mean-density overdensity and cannot be expressed as a \
                 multiple of the critical density"
                    .to_string(),
            )),
        }
    }
}

impl fmt::Display for FitDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An overdensity threshold expressed relative to the critical density.
///
/// `Critical(x)` is a literal multiple (e.g. 200, 500, 2500); `Virial` is the
/// cosmology- and epoch-dependent virial overdensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverdensityThreshold {
    Critical(f64),
    Virial,
}

impl OverdensityThreshold {
    /// Parse a threshold identifier: `<number>c` or `vir`.
    ///
    /// Mean-density identifiers such as `200m` are not resolvable to a
    /// critical-density multiple and are rejected with a lookup error.
    pub fn parse(s: &str) -> Result<Self> {
        if s == "vir" {
            return Ok(OverdensityThreshold::Virial);
        }
        if let Some(number) = s.strip_suffix('c') {
            let multiple: f64 = number.parse().map_err(|_| {
                ConvertError::Lookup(format!(
                    "cannot resolve \"{s}\" to a critical overdensity; expected \"<number>c\" or \"vir\""
                ))
            })?;
            if !(multiple.is_finite() && multiple > 0.0) {
                return Err(ConvertError::Validation(format!(
                    "critical overdensity multiple must be strictly positive, got {multiple}"
                )));
            }
            return Ok(OverdensityThreshold::Critical(multiple));
        }
        Err(ConvertError::Lookup(format!(
            "cannot resolve \"{s}\" to a critical overdensity; expected \"<number>c\" or \"vir\""
        )))
    }
}

/// Pivot values a fit's log-ratio terms are centred on.
///
/// A missing pivot drops the corresponding term (the pivot is taken to
/// coincide with the queried value). Present pivots must be strictly
/// positive, since they appear as log-ratio denominators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pivots {
    #[serde(rename = "M", default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omega_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omega_b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma8: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h0: Option<f64>,
}

impl Pivots {
    /// Look up a pivot by its published name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "M" => self.mass,
            "a" => self.a,
            "omega_m" => self.omega_m,
            "omega_b" => self.omega_b,
            "sigma8" => self.sigma8,
            "h0" => self.h0,
            _ => None,
        }
    }

    /// Set a pivot by its published name.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConvertError::Validation(format!(
                "pivot \"{name}\" must be strictly positive, got {value}"
            )));
        }
        let slot = match name {
            "M" => &mut self.mass,
            "a" => &mut self.a,
            "omega_m" => &mut self.omega_m,
            "omega_b" => &mut self.omega_b,
            "sigma8" => &mut self.sigma8,
            "h0" => &mut self.h0,
            other => {
                return Err(ConvertError::Validation(format!(
                    "\"{other}\" is not a valid pivot name; expected one of {}",
                    FIT_PIVOT_NAMES.join(", ")
                )));
            }
        };
        *slot = Some(value);
        Ok(())
    }

    /// Whether every present pivot is strictly positive.
    pub fn all_positive(&self) -> bool {
        FIT_PIVOT_NAMES
            .iter()
            .filter_map(|name| self.get(name))
            .all(|v| v.is_finite() && v > 0.0)
    }
}

/// One fit: the ordered coefficient vector plus the pivots it is centred on.
///
/// Published tables carry 16 (full) or 12 (lite) coefficients; user-supplied
/// tables built from `--set-fit-parameters` / `--set-pivots` always use the
/// full arity, with unset coefficients at zero and unset pivots absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitTable {
    pub params: Vec<f64>,
    pub pivots: Pivots,
}

impl FitTable {
    /// An empty full-arity table, the starting point for user overrides.
    pub fn custom() -> Self {
        FitTable {
            params: vec![0.0; FIT_PARAMETER_NAMES.len()],
            pivots: Pivots::default(),
        }
    }

    /// Set a coefficient by its published (full-parametrisation) name.
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        let index = FIT_PARAMETER_NAMES
            .iter()
            .position(|&n| n == name)
            .ok_or_else(|| {
                ConvertError::Validation(format!(
                    "\"{name}\" is not a valid fit parameter name; expected one of {}",
                    FIT_PARAMETER_NAMES.join(", ")
                ))
            })?;
        if !value.is_finite() {
            return Err(ConvertError::Validation(format!(
                "fit parameter \"{name}\" must be finite, got {value}"
            )));
        }
        if index >= self.params.len() {
            return Err(ConvertError::Validation(format!(
                "fit parameter \"{name}\" does not exist in a table with {} coefficients",
                self.params.len()
            )));
        }
        self.params[index] = value;
        Ok(())
    }
}
