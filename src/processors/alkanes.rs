//! Normalisation of alkane retention-index files.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ColumnMapping;
use crate::core::table::Table;
use crate::core::transforms::{rename_columns, strip_column_names};
use crate::core::{read_table, write_tsv};

/// Strip column names and rename the mapped ones; other columns are kept.
pub fn process_alkanes(table: &Table, columns: &[ColumnMapping]) -> Table {
    let mut out = table.clone();
    strip_column_names(&mut out);
    rename_columns(&mut out, columns);
    out
}

/// Normalise an alkane file and write it as TSV with a header line.
///
/// # Returns
///
/// The number of rows written.
pub fn process_alkanes_file(input: &Path, output: &Path, columns: &[ColumnMapping]) -> Result<usize> {
    let table = read_table(input)
        .with_context(|| format!("Failed to read alkane file: {}", input.display()))?;
    let result = process_alkanes(&table, columns);
    write_tsv(&result, output, true, false)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    log::info!("{}: {} alkanes", input.display(), result.n_rows());
    Ok(result.n_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlkaneConfig;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, Builder};

    #[test]
    fn test_process_alkanes_strips_and_renames() {
        let table = Table::new(&["Carbon number ", " RT (min)", "Comment"]);
        let out = process_alkanes(&table, &AlkaneConfig::default().columns);
        assert_eq!(out.column_names(), vec!["carbon_number", "rt", "Comment"]);
    }

    #[test]
    fn test_process_alkanes_file() {
        let mut input = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(input, "Carbon number\tRT (min) ").unwrap();
        for (carbon, rt) in [(12, "2.8"), (13, "3.0"), (14, "3.3")] {
            writeln!(input, "{}\t{}", carbon, rt).unwrap();
        }
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let output = dir.path().join("alkanes.tsv");

        let rows = process_alkanes_file(input.path(), &output, &AlkaneConfig::default().columns).unwrap();

        assert_eq!(rows, 3);
        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["carbon_number\trt", "12\t2.8", "13\t3.0", "14\t3.3"]);
    }
}
