//! Tab-separated output.
//!
//! Every processor exports its result through [`write_tsv`]. Whether the header
//! line and the row index are written is chosen per call.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::table::Table;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Output path does not end in `.tsv`.
    #[error("Unsupported file format. Please point to a TSV file.")]
    UnsupportedFormat(String),

    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to flush data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("TSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write a table as tab-separated values.
///
/// # Arguments
///
/// * `table` - Table to serialise
/// * `path` - Output path; must end in `.tsv` (parent directories are created)
/// * `include_header` - Write the column names as the first line
/// * `include_index` - Write the row labels as the first field of every line
///
/// # Errors
///
/// Returns [`WriteError::UnsupportedFormat`] if the extension is not exactly
/// `tsv`, or an I/O error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use rcx_tk::core::table::Table;
/// use rcx_tk::core::writers::write_tsv;
/// use std::path::Path;
///
/// let table = Table::new(&["sampleName", "injectionOrder"]);
/// write_tsv(&table, Path::new("processed.tsv"), true, false).unwrap();
/// ```
pub fn write_tsv(
    table: &Table,
    path: &Path,
    include_header: bool,
    include_index: bool,
) -> Result<()> {
    let path_str = path.display().to_string();
    if path.extension().and_then(|e| e.to_str()) != Some("tsv") {
        return Err(WriteError::UnsupportedFormat(path_str));
    }

    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path_str.clone(),
        source: e,
    })?;
    let mut tsv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(file));

    if include_header {
        let mut header: Vec<String> = Vec::with_capacity(table.n_cols() + 1);
        if include_index {
            header.push(table.index_name.clone().unwrap_or_default());
        }
        header.extend(table.column_names());
        tsv_writer
            .write_record(&header)
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    for pos in 0..table.n_rows() {
        let mut record: Vec<String> = Vec::with_capacity(table.n_cols() + 1);
        if include_index {
            record.push(table.index[pos].to_string());
        }
        record.extend(table.columns.iter().map(|c| c.values[pos].to_string()));
        tsv_writer
            .write_record(&record)
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    tsv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    log::debug!("{} rows -> {}", table.n_rows(), path.display());
    Ok(())
}
