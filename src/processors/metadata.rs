//! Normalisation of batch specification (metadata) files.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ColumnMapping;
use crate::core::table::{Table, TableError};
use crate::core::transforms::{map_text_column, select_and_rename};
use crate::core::{read_table, write_tsv};

use super::filenames::replace_spaces;

/// Column whose values get their spaces replaced.
pub const SAMPLE_NAME: &str = "sampleName";

/// Keep and rename the mapped columns, then make sample names space-free.
///
/// # Errors
///
/// Returns [`TableError::MissingColumns`] if any mapped source column is absent.
pub fn process_metadata(table: &Table, columns: &[ColumnMapping]) -> Result<Table, TableError> {
    let mut out = select_and_rename(table, columns)?;
    if out.position(SAMPLE_NAME).is_some() {
        map_text_column(&mut out, SAMPLE_NAME, replace_spaces)?;
    }
    Ok(out)
}

/// Normalise a metadata file and write it as TSV with a header line.
///
/// # Returns
///
/// The number of rows written.
pub fn process_metadata_file(input: &Path, output: &Path, columns: &[ColumnMapping]) -> Result<usize> {
    let table = read_table(input)
        .with_context(|| format!("Failed to read metadata file: {}", input.display()))?;
    let result = process_metadata(&table, columns)
        .with_context(|| format!("Failed to process metadata file: {}", input.display()))?;
    write_tsv(&result, output, true, false)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    log::info!("{}: {} samples", input.display(), result.n_rows());
    Ok(result.n_rows())
}
