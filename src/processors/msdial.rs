//! Deduplication of MS-DIAL alignment tables.
//!
//! MS-DIAL can report the same compound as several alignments that carry
//! identical abundances in one or more samples. This module merges them:
//!
//! 1. **Shaping**: the header row at `skip_rows` names the columns and the
//!    alignment identifier becomes the row index.
//! 2. **Duplicate detection**: per abundance column, rows sharing the same
//!    strictly positive value form a duplicate group.
//! 3. **Clustering**: overlapping groups are merged transitively.
//! 4. **Aggregation**: each cluster collapses into one row (mean for the first
//!    three metadata columns, comma-joined text for the remaining metadata
//!    columns, maximum for abundances), labelled with its member ids.
//! 5. **Recomposition**: member rows are dropped and the summary rows appended.
//!
//! The caller's table is never modified.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::MsdialConfig;
use crate::core::table::{Table, TableError, Value};
use crate::core::transforms::concat_values;
use crate::core::{read_table, write_tsv};

use super::clustering::find_clusters;

/// Number of leading metadata columns aggregated with the mean.
const MEAN_COLUMNS: usize = 3;

/// Errors that can occur while deduplicating an alignment table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MsdialError {
    #[error("header row {skip_rows} is beyond the end of the table ({n_rows} rows)")]
    HeaderOutOfRange { skip_rows: usize, n_rows: usize },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Reduction applied to a column when collapsing a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Arithmetic mean of the numeric values.
    Mean,
    /// Text of every value joined with `,`, in member order.
    Concat,
    /// Maximum of the numeric values.
    Max,
}

impl Aggregation {
    /// Reduce the values of `column` for one cluster.
    pub fn apply(&self, column: &str, labels: &[&Value], values: &[&Value]) -> Result<Value, TableError> {
        match self {
            Aggregation::Concat => Ok(Value::Text(concat_values(values.iter().copied()))),
            Aggregation::Mean => {
                let numbers = numeric_values(column, labels, values)?;
                if numbers.is_empty() {
                    return Ok(Value::Empty);
                }
                Ok(Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64))
            }
            Aggregation::Max => {
                let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_empty()).collect();
                if !present.is_empty() && present.iter().all(|v| matches!(v, Value::Int(_))) {
                    let max = present
                        .iter()
                        .filter_map(|v| match v {
                            Value::Int(i) => Some(*i),
                            _ => None,
                        })
                        .max();
                    return Ok(max.map_or(Value::Empty, Value::Int));
                }
                let numbers = numeric_values(column, labels, values)?;
                Ok(numbers
                    .into_iter()
                    .reduce(f64::max)
                    .map_or(Value::Empty, Value::Float))
            }
        }
    }
}

/// Non-missing numeric values, failing on text that is not a number.
fn numeric_values(column: &str, labels: &[&Value], values: &[&Value]) -> Result<Vec<f64>, TableError> {
    let mut numbers = Vec::with_capacity(values.len());
    for (label, value) in labels.iter().zip(values) {
        let x = value.as_f64().ok_or_else(|| TableError::TypeCoercion {
            column: column.to_string(),
            row: label.to_string(),
            value: value.to_string(),
        })?;
        if !x.is_nan() {
            numbers.push(x);
        }
    }
    Ok(numbers)
}

/// Alignment table with its header applied and the identifier as index.
#[derive(Debug, Clone)]
pub struct ShapedTable {
    /// Full table, including the header row and any preamble rows above it.
    pub table: Table,
    /// Positions of the rows holding alignments.
    pub data_rows: Vec<usize>,
    /// Number of leading metadata columns.
    pub metadata_cols: usize,
}

impl ShapedTable {
    /// Abundance columns restricted to the alignment rows.
    pub fn data_matrix(&self) -> Table {
        let mut matrix = self.table.select_rows(&self.data_rows);
        matrix.columns.drain(..self.metadata_cols);
        matrix
    }

    /// Names of the leading metadata columns.
    pub fn metadata_columns(&self) -> Vec<String> {
        self.table.columns[..self.metadata_cols]
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Names of the abundance columns.
    pub fn abundance_columns(&self) -> Vec<String> {
        self.table.columns[self.metadata_cols..]
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Apply the header row and set the alignment identifier as the row index.
///
/// # Errors
///
/// Fails if the header row lies outside the table or the index column is
/// not among the header names.
pub fn shape_table(raw: &Table, config: &MsdialConfig) -> Result<ShapedTable, MsdialError> {
    let skip_rows = config.skip_rows;
    if skip_rows >= raw.n_rows() {
        return Err(MsdialError::HeaderOutOfRange {
            skip_rows,
            n_rows: raw.n_rows(),
        });
    }

    let mut table = raw.clone();
    for col in &mut table.columns {
        col.name = col.values[skip_rows].to_string();
    }
    table.set_index(&config.index_col)?;

    // Preamble rows and the header row never hold abundances.
    let data_rows: Vec<usize> = if skip_rows == 0 {
        (1..table.n_rows()).collect()
    } else {
        (skip_rows + 1..table.n_rows()).collect()
    };
    let metadata_cols = config.metadata_cols.min(table.n_cols());

    Ok(ShapedTable {
        table,
        data_rows,
        metadata_cols,
    })
}

/// Find groups of rows sharing a strictly positive value, column by column.
///
/// # Returns
///
/// Row positions (within `data_matrix`) of every duplicate group, in column
/// order and ascending value order within a column. Groups are not merged.
///
/// # Errors
///
/// Returns [`TableError::TypeCoercion`] if a value is not numeric.
pub fn find_all_duplicates(data_matrix: &Table) -> Result<Vec<Vec<usize>>, TableError> {
    let mut all_duplicates = Vec::new();

    for col in &data_matrix.columns {
        let mut positive: Vec<(f64, usize)> = Vec::with_capacity(col.values.len());
        for (pos, value) in col.values.iter().enumerate() {
            let x = value.as_f64().ok_or_else(|| TableError::TypeCoercion {
                column: col.name.clone(),
                row: data_matrix.index[pos].to_string(),
                value: value.to_string(),
            })?;
            if x > 0.0 {
                positive.push((x, pos));
            }
        }
        positive.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut start = 0;
        while start < positive.len() {
            let value = positive[start].0;
            let end = positive[start..]
                .iter()
                .position(|&(x, _)| x != value)
                .map_or(positive.len(), |offset| start + offset);
            if end - start > 1 {
                all_duplicates.push(positive[start..end].iter().map(|&(_, pos)| pos).collect());
            }
            start = end;
        }
    }

    Ok(all_duplicates)
}

/// Build the column → reduction mapping.
pub fn aggregations(
    mean_columns: &[String],
    concat_columns: &[String],
    abundance_columns: &[String],
) -> HashMap<String, Aggregation> {
    let mut aggregate_functions = HashMap::new();
    for col in mean_columns {
        aggregate_functions.insert(col.clone(), Aggregation::Mean);
    }
    for col in concat_columns {
        aggregate_functions.insert(col.clone(), Aggregation::Concat);
    }
    for col in abundance_columns {
        aggregate_functions.insert(col.clone(), Aggregation::Max);
    }
    aggregate_functions
}

/// Collapse the rows at `members` into one row, column by column.
///
/// Columns without an entry in `aggregate_functions` are concatenated.
pub fn aggregate_cluster(
    table: &Table,
    members: &[usize],
    aggregate_functions: &HashMap<String, Aggregation>,
) -> Result<Vec<Value>, TableError> {
    let labels: Vec<&Value> = members.iter().map(|&p| &table.index[p]).collect();
    table
        .columns
        .iter()
        .map(|col| {
            let values: Vec<&Value> = members.iter().map(|&p| &col.values[p]).collect();
            aggregate_functions
                .get(&col.name)
                .copied()
                .unwrap_or(Aggregation::Concat)
                .apply(&col.name, &labels, &values)
        })
        .collect()
}

/// Merge duplicate alignments of an MS-DIAL table.
///
/// # Arguments
///
/// * `raw` - Table as read from the export, header row still among the rows
/// * `config` - Header offset, metadata column count and identifier column
///
/// # Returns
///
/// A new table: every row not involved in a duplicate, in input order,
/// followed by one summary row per cluster labelled with its comma-joined
/// member ids.
pub fn process_msdial(raw: &Table, config: &MsdialConfig) -> Result<Table, MsdialError> {
    let shaped = shape_table(raw, config)?;
    let table = &shaped.table;

    let all_duplicates: Vec<Vec<usize>> = find_all_duplicates(&shaped.data_matrix())?
        .into_iter()
        .map(|group| group.into_iter().map(|p| shaped.data_rows[p]).collect())
        .collect();

    let mut clusters = find_clusters(&all_duplicates);
    for cluster in &mut clusters {
        cluster.sort_by(|&a, &b| table.index[a].natural_cmp(&table.index[b]).then(a.cmp(&b)));
    }

    let metadata_columns = shaped.metadata_columns();
    let split = MEAN_COLUMNS.min(metadata_columns.len());
    let aggregate_functions = aggregations(
        &metadata_columns[..split],
        &metadata_columns[split..],
        &shaped.abundance_columns(),
    );

    let clustered: HashSet<usize> = clusters.iter().flatten().copied().collect();
    let remainder: Vec<usize> = (0..table.n_rows()).filter(|p| !clustered.contains(p)).collect();
    let mut result = table.select_rows(&remainder);

    for cluster in &clusters {
        let label = concat_values(cluster.iter().map(|&p| &table.index[p]));
        let row = aggregate_cluster(table, cluster, &aggregate_functions)?;
        log::debug!("cluster {} -> {} rows merged", label, cluster.len());
        result.push_row(Value::Text(label), row)?;
    }
    result.index_name = Some(config.index_col.clone());

    log::info!(
        "{} duplicate groups, {} clusters, {} alignments merged",
        all_duplicates.len(),
        clusters.len(),
        clustered.len()
    );
    Ok(result)
}

/// Deduplicate an MS-DIAL export and write it as TSV.
///
/// The output has no header line and starts every line with the row label;
/// the header row of the export is carried as a regular row.
///
/// # Returns
///
/// The number of rows written.
pub fn process_msdial_file(input: &Path, output: &Path, config: &MsdialConfig) -> Result<usize> {
    let raw = read_table(input)
        .with_context(|| format!("Failed to read MS-DIAL file: {}", input.display()))?;
    let result = process_msdial(&raw, config)
        .with_context(|| format!("Failed to deduplicate alignments in {}", input.display()))?;
    write_tsv(&result, output, false, true)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    Ok(result.n_rows())
}
