//! Error taxonomy for the conversion engine.
//!
//! Every fallible path falls into one of four classes:
//!
//! - `Validation` — missing or invalid input parameters
//! - `Lookup` — a threshold/variant combination with no published fit table
//! - `Convergence` — the fixed-point solver ran out of iterations
//! - `Io` — reading or writing a fit-table file failed
//!
//! Errors propagate synchronously to the caller; the library itself never
//! prints or logs. The binary turns any error into a single stderr line and
//! a non-zero exit (full detail with `--debug`).

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("lookup error: {0}")]
    Lookup(String),

    #[error(
        "no convergence: relative change {last_error:.3e} after {iterations} iterations (tolerance {tolerance:.1e})"
    )]
    Convergence {
        iterations: usize,
        last_error: f64,
        tolerance: f64,
    },

    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
