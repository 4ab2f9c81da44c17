//! Table loaders for the instrument export formats.
//!
//! This module reads the formats produced by acquisition and processing software:
//! - Comma-separated files (`.csv`, UTF-8)
//! - Tab-separated files (`.tsv`, `.txt`)
//! - Excel workbooks (`.xls`, `.xlsx`, first worksheet)
//!
//! The first line (or worksheet row) is taken as the header.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use thiserror::Error;

use super::table::{Table, TableError, Value};

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Unsupported file format. Please provide a CSV, Excel, or TSV file.")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel parsing error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Input format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Excel,
}

impl InputFormat {
    /// Detect the format from the (case-insensitive) extension of `path`.
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("tsv") | Some("txt") => Ok(InputFormat::Tsv),
            Some("xls") | Some("xlsx") => Ok(InputFormat::Excel),
            _ => Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Read a CSV, TSV or Excel file into a [`Table`].
///
/// # Errors
///
/// Returns [`LoaderError::UnsupportedFormat`] for any extension other than
/// `csv`, `tsv`, `txt`, `xls` or `xlsx`, and an I/O or parse error if the file
/// cannot be read.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut table = match InputFormat::detect(path)? {
        InputFormat::Csv => load_delimited(path, b',')?,
        InputFormat::Tsv => load_delimited(path, b'\t')?,
        InputFormat::Excel => load_excel(path)?,
    };
    table.unify_numeric_columns();

    log::debug!(
        "{}: read {} rows x {} columns",
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

fn load_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }
    let names: Vec<&str> = headers.iter().collect();
    let width = names.len();
    let mut table = Table::new(&names);

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let mut row: Vec<Value> = record.iter().take(width).map(Value::parse).collect();
        row.resize(width, Value::Empty);
        table.push_row(Value::Int(i as i64), row)?;
    }

    Ok(table)
}

fn load_excel(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoaderError::EmptyFile(path.to_path_buf()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| LoaderError::EmptyFile(path.to_path_buf()))?;
    let names: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    let width = names.len();
    let mut table = Table::new(&names);

    for (i, cells) in rows.enumerate() {
        let mut row: Vec<Value> = cells.iter().take(width).map(excel_value).collect();
        row.resize(width, Value::Empty);
        table.push_row(Value::Int(i as i64), row)?;
    }

    Ok(table)
}

/// Excel stores every number as a double; integral ones are read back as integers.
fn excel_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Int(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_with_suffix(suffix: &str, lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(InputFormat::detect(Path::new("a.CSV")).unwrap(), InputFormat::Csv);
        assert_eq!(InputFormat::detect(Path::new("a.txt")).unwrap(), InputFormat::Tsv);
        assert_eq!(InputFormat::detect(Path::new("a.xlsx")).unwrap(), InputFormat::Excel);
        assert!(matches!(
            InputFormat::detect(Path::new("batch_specification1.prn")),
            Err(LoaderError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_csv() -> Result<()> {
        let file = temp_with_suffix(
            ".csv",
            &["File name,Type,Analytical order", "1_QC_1,QC,1", "18_QC 4 _18,QC,18"],
        );

        let table = read_table(file.path())?;
        assert_eq!(table.column_names(), vec!["File name", "Type", "Analytical order"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.columns[0].values[1], Value::from("18_QC 4 _18"));
        assert_eq!(table.columns[2].values[1], Value::Int(18));

        Ok(())
    }

    #[test]
    fn test_read_tab_separated_txt() -> Result<()> {
        let file = temp_with_suffix(".txt", &["Carbon number\tRT (min)", "12\t2.8", "13\t3"]);

        let table = read_table(file.path())?;
        assert_eq!(table.column_names(), vec!["Carbon number", "RT (min)"]);
        assert_eq!(table.columns[1].values, vec![Value::Float(2.8), Value::Float(3.0)]);

        Ok(())
    }

    #[test]
    fn test_short_records_are_padded() -> Result<()> {
        let file = temp_with_suffix(".tsv", &["a\tb\tc", "1", "1\t2\t3"]);

        let table = read_table(file.path())?;
        assert_eq!(table.row(0), vec![Value::Int(1), Value::Empty, Value::Empty]);

        Ok(())
    }

    #[test]
    fn test_read_unsupported_extension() {
        let file = temp_with_suffix(".prn", &["a,b", "1,2"]);
        let err = read_table(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
        assert_eq!(
            err.to_string(),
            "Unsupported file format. Please provide a CSV, Excel, or TSV file."
        );
    }

    #[test]
    fn test_excel_value_conversion() {
        assert_eq!(excel_value(&Data::Float(18.0)), Value::Int(18));
        assert_eq!(excel_value(&Data::Float(2.8)), Value::Float(2.8));
        assert_eq!(excel_value(&Data::Empty), Value::Empty);
        assert_eq!(
            excel_value(&Data::String("QC".to_string())),
            Value::Text("QC".to_string())
        );
    }
}
