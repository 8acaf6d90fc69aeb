//! Conversions between spherical-overdensity definitions.
//!
//! - resolve threshold identifiers to critical-density multiples
//! - convert concentrations (fixed point on a profile shape, or the
//!   Hu & Kratsov 2002 closed form)
//! - rescale masses via the definitional scaling law

pub mod concentration;
pub mod mass;
pub mod overdensity;

pub use concentration::*;
pub use mass::*;
pub use overdensity::*;
