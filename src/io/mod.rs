//! Reading and writing portable fit-table files.

pub mod table;

pub use table::*;
