//! CSV output of the converted tabular form.
//!
//! When the caller supplies an output destination, the table produced by
//! the conversion chain is written out before extraction runs, matching
//! what the upstream system stored alongside every import.

use std::path::Path;

use crate::common::error::{Error, Result};
use crate::sheet::Table;

/// Write the table as UTF-8 CSV with RFC-4180 quoting.
///
/// Missing cells render as empty fields; rows keep their ragged widths.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    for row in table {
        let width = row.cells().iter().map(|c| c.column).max().unwrap_or(0);
        let mut fields = vec![String::new(); width as usize];
        for cell in row.cells() {
            if cell.column >= 1 {
                fields[(cell.column - 1) as usize] = cell.value.display_text();
            }
        }
        writer.write_record(&fields).map_err(csv_error)?;
    }
    writer.flush()?;
    log::info!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn csv_error(err: csv::Error) -> Error {
    Error::Io(std::io::Error::other(err))
}
