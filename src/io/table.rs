//! Read/write fit-table JSON files.
//!
//! Table JSON is the "portable" representation of one fit:
//! - the overdensity identifier (and target identifier for MM tables)
//! - which relation and parametrisation it belongs to
//! - the coefficient vector and the pivots
//!
//! A loaded table stands in for the published one in any relation-based
//! conversion, which makes refitted or experimental coefficient sets usable
//! without rebuilding.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FitRelation, FitTable};
use crate::error::{ConvertError, Result};

/// A saved fit table (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFile {
    pub tool: String,
    pub relation: FitRelation,
    pub variant: String,
    pub delta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta2: Option<String>,
    #[serde(flatten)]
    pub table: FitTable,
}

impl TableFile {
    /// Check the structural invariants of a loaded table.
    pub fn validate(&self) -> Result<()> {
        let n = self.table.params.len();
        if n != 16 && n != 12 {
            return Err(ConvertError::Validation(format!(
                "fit table \"{}\" has {n} coefficients; expected 16 (full) or 12 (lite)",
                self.delta
            )));
        }
        if !self.table.params.iter().all(|v| v.is_finite()) {
            return Err(ConvertError::Validation(format!(
                "fit table \"{}\" contains non-finite coefficients",
                self.delta
            )));
        }
        if !self.table.pivots.all_positive() {
            return Err(ConvertError::Validation(format!(
                "fit table \"{}\" has non-positive pivot values",
                self.delta
            )));
        }
        Ok(())
    }
}

/// Write a fit-table JSON file.
pub fn write_table_json(path: &Path, table_file: &TableFile) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        ConvertError::Io(format!(
            "failed to create fit-table JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, table_file)
        .map_err(|e| ConvertError::Io(format!("failed to write fit-table JSON: {e}")))?;
    Ok(())
}

/// Read and validate a fit-table JSON file.
pub fn read_table_json(path: &Path) -> Result<TableFile> {
    let file = File::open(path).map_err(|e| {
        ConvertError::Io(format!(
            "failed to open fit-table JSON '{}': {e}",
            path.display()
        ))
    })?;
    let table_file: TableFile = serde_json::from_reader(file)
        .map_err(|e| ConvertError::Io(format!("invalid fit-table JSON: {e}")))?;
    table_file.validate()?;
    Ok(table_file)
}
