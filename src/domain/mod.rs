//! Domain types used throughout the converter.
//!
//! This module defines:
//!
//! - input parameter bundles (`Cosmology`, `HaloState`)
//! - configuration enums (`ModelVariant`, `ConversionMethod`, `FitRelation`)
//! - overdensity identifiers (`FitDelta`, `OverdensityThreshold`)
//! - fit data records (`FitTable`, `Pivots`) and the fixed name sets

pub mod types;

pub use types::*;
