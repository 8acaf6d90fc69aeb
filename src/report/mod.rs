//! Terminal output formatting.

pub mod format;

pub use format::*;
