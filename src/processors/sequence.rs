//! Normalisation of sequence files.
//!
//! Besides selecting and renaming the sequence columns, the identifiers encoded
//! in each injection's file name are split out into their own columns:
//! - `sequenceIdentifier`: the name without its trailing `_<digits>`
//! - `subjectIdentifier`: the part between the leading and trailing numbers
//! - `localOrder`: the trailing number

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::ColumnMapping;
use crate::core::table::{Column, Table, TableError, Value};
use crate::core::transforms::select_and_rename;
use crate::core::{read_table, write_tsv};

use super::filenames::{
    local_order, replace_spaces, sequence_identifier, subject_identifier, validate_filename,
};

const FILE_NAME: &str = "File name";

/// Errors that can occur while processing a sequence table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SequenceError {
    #[error("Invalid File name: {0}")]
    InvalidFileName(String),

    #[error("Cannot derive {field} from file name '{file_name}'")]
    MalformedFileName { field: &'static str, file_name: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Columns kept from a sequence file; `File name` keeps its name until cleanup.
fn sequence_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new(FILE_NAME, FILE_NAME),
        ColumnMapping::new("Type", "sampleType"),
        ColumnMapping::new("Class ID", "class"),
        ColumnMapping::new("Batch", "batch"),
        ColumnMapping::new("Analytical order", "injectionOrder"),
    ]
}

/// Build column `field` by applying `f` to every file name.
fn derive_column<F>(field: &'static str, file_names: &[String], f: F) -> Result<Column, SequenceError>
where
    F: Fn(&str) -> Option<Value>,
{
    let values = file_names
        .iter()
        .map(|n| {
            f(n).ok_or_else(|| SequenceError::MalformedFileName {
                field,
                file_name: n.clone(),
            })
        })
        .collect::<Result<Vec<Value>, SequenceError>>()?;
    Ok(Column::new(field, values))
}

/// True if every injection order is an integer.
pub fn validate_injection_order(table: &Table) -> bool {
    table
        .column("injectionOrder")
        .is_some_and(|c| c.values.iter().all(|v| matches!(v, Value::Int(_))))
}

/// Process a sequence table.
///
/// # Returns
///
/// Columns `sampleName, sampleType, class, batch, injectionOrder,
/// sequenceIdentifier, subjectIdentifier, localOrder`.
///
/// # Errors
///
/// Fails if a required column is missing or any file name is invalid.
pub fn process_sequence(table: &Table) -> Result<Table, SequenceError> {
    let mut df = select_and_rename(table, &sequence_columns())?;

    let file_names: Vec<String> = df
        .column(FILE_NAME)
        .map(|c| c.values.iter().map(|v| v.to_string()).collect())
        .unwrap_or_default();
    if let Some(bad) = file_names.iter().find(|n| !validate_filename(n)) {
        return Err(SequenceError::InvalidFileName(bad.clone()));
    }
    if !validate_injection_order(&df) {
        log::warn!("injectionOrder contains non-integer values");
    }

    df.push_column(derive_column("sampleName", &file_names, |n| {
        Some(Value::Text(replace_spaces(n)))
    })?)?;
    df.push_column(derive_column("sequenceIdentifier", &file_names, |n| {
        sequence_identifier(n).map(Value::Text)
    })?)?;
    df.push_column(derive_column("subjectIdentifier", &file_names, |n| {
        subject_identifier(n).map(Value::Text)
    })?)?;
    df.push_column(derive_column("localOrder", &file_names, |n| {
        local_order(n).map(Value::Int)
    })?)?;

    // Cleanup: drop the raw file name and lead with the sample name.
    df.remove_column(FILE_NAME)?;
    let sample_name = df.remove_column("sampleName")?;
    df.columns.insert(0, sample_name);

    Ok(df)
}

/// Normalise a sequence file and write it as TSV with a header line.
///
/// # Returns
///
/// The number of rows written.
pub fn process_sequence_file(input: &Path, output: &Path) -> Result<usize> {
    let table = read_table(input)
        .with_context(|| format!("Failed to read sequence file: {}", input.display()))?;
    let result = process_sequence(&table)
        .with_context(|| format!("Failed to process sequence file: {}", input.display()))?;
    write_tsv(&result, output, true, false)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    log::info!("{}: {} injections", input.display(), result.n_rows());
    Ok(result.n_rows())
}
