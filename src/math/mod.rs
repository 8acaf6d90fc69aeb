//! Mathematical utilities: profile shape functions and fixed-point iteration.

pub mod fixed_point;
pub mod profile;

pub use fixed_point::*;
pub use profile::*;
