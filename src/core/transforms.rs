//! Column-level transforms shared by the table processors.

use crate::config::ColumnMapping;

use super::table::{Result, Table, Value};

/// Keep only the mapped columns, in mapping order, renamed to their targets.
///
/// # Errors
///
/// Returns [`TableError::MissingColumns`](super::table::TableError::MissingColumns)
/// naming every source column that is absent.
pub fn select_and_rename(table: &Table, mapping: &[ColumnMapping]) -> Result<Table> {
    let sources: Vec<&str> = mapping.iter().map(|m| m.source.as_str()).collect();
    let mut selected = select_columns(table, &sources)?;
    rename_columns(&mut selected, mapping);
    Ok(selected)
}

/// Keep only `names`, in the given order.
pub fn select_columns(table: &Table, names: &[&str]) -> Result<Table> {
    table.require_columns(names)?;
    let columns = names
        .iter()
        .filter_map(|name| table.column(name).cloned())
        .collect();
    Ok(Table {
        columns,
        index: table.index.clone(),
        index_name: table.index_name.clone(),
    })
}

/// Rename every column matching a mapping source; other columns are left alone.
pub fn rename_columns(table: &mut Table, mapping: &[ColumnMapping]) {
    for col in &mut table.columns {
        if let Some(m) = mapping.iter().find(|m| m.source == col.name) {
            col.name = m.target.clone();
        }
    }
}

/// Strip surrounding whitespace from every column name.
pub fn strip_column_names(table: &mut Table) {
    for col in &mut table.columns {
        col.name = col.name.trim().to_string();
    }
}

/// Apply `f` to the text of every value in column `name`.
pub fn map_text_column<F>(table: &mut Table, name: &str, f: F) -> Result<()>
where
    F: Fn(&str) -> String,
{
    table.require_columns(&[name])?;
    if let Some(col) = table.column_mut(name) {
        for v in &mut col.values {
            *v = Value::Text(f(&v.to_string()));
        }
    }
    Ok(())
}

/// Join the text form of `values` with `,`.
pub fn concat_values<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
