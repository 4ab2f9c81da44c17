//! In-memory tabular model shared by every processor.
//!
//! A [`Table`] is stored column-major: each [`Column`] owns its values and all
//! columns are aligned to a shared row index of [`Value`] labels.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Errors raised by table lookups and conversions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("{0:?} not in index")]
    MissingColumns(Vec<String>),

    #[error("cannot convert value '{value}' in column '{column}' (row {row}) to a number")]
    TypeCoercion {
        column: String,
        row: String,
        value: String,
    },

    #[error("row has {found} values, table has {expected} columns")]
    ShapeMismatch { expected: usize, found: usize },
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Infer a typed value from a raw text field.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Value::Empty;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        Value::Text(raw.to_string())
    }

    /// Numeric view of the value. `Empty` maps to NaN, non-numeric text to `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Empty => Some(f64::NAN),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Ordering used for row labels: numbers first (numerically), then text.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        let num = |v: &Value| match v {
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => v.as_f64(),
            _ => None,
        };
        match (num(self), num(other)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered set of named columns aligned to a row index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<Column>,
    /// Row labels, one per row.
    pub index: Vec<Value>,
    /// Name of the index, if the index was taken from a column.
    pub index_name: Option<String>,
}

impl Table {
    /// Creates an empty table with the given column names.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            columns: names
                .iter()
                .map(|n| Column::new(n.as_ref(), Vec::new()))
                .collect(),
            index: Vec::new(),
            index_name: None,
        }
    }

    /// Builds a table from row-major records, labelling rows 0..n.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(names);
        for (i, row) in rows.into_iter().enumerate() {
            table.push_row(Value::Int(i as i64), row)?;
        }
        Ok(table)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Position of the first column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Values of row `pos` across all columns.
    pub fn row(&self, pos: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.values[pos].clone()).collect()
    }

    /// Appends a row. The row must have exactly one value per column.
    pub fn push_row(&mut self, label: Value, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(TableError::ShapeMismatch {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        for (col, value) in self.columns.iter_mut().zip(values) {
            col.values.push(value);
        }
        self.index.push(label);
        Ok(())
    }

    /// Appends a column aligned to the existing rows.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if column.values.len() != self.n_rows() {
            return Err(TableError::ShapeMismatch {
                expected: self.n_rows(),
                found: column.values.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Removes and returns the column called `name`.
    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let pos = self
            .position(name)
            .ok_or_else(|| TableError::MissingColumns(vec![name.to_string()]))?;
        Ok(self.columns.remove(pos))
    }

    /// New table holding the rows at `positions`, in the given order.
    pub fn select_rows(&self, positions: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| {
                    Column::new(
                        c.name.clone(),
                        positions.iter().map(|&p| c.values[p].clone()).collect(),
                    )
                })
                .collect(),
            index: positions.iter().map(|&p| self.index[p].clone()).collect(),
            index_name: self.index_name.clone(),
        }
    }

    /// Moves column `name` into the row index.
    pub fn set_index(&mut self, name: &str) -> Result<()> {
        let column = self.remove_column(name)?;
        self.index = column.values;
        self.index_name = Some(column.name);
        Ok(())
    }

    /// Fails with every name in `names` that is not a column, in request order.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .map(|n| n.as_ref())
            .filter(|n| self.position(n).is_none())
            .map(String::from)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TableError::MissingColumns(missing))
        }
    }

    /// Promotes integers to floats in every purely numeric column that holds
    /// floats. Columns with any text or boolean cell keep their cells as read.
    pub fn unify_numeric_columns(&mut self) {
        for col in &mut self.columns {
            let has_float = col.values.iter().any(|v| matches!(v, Value::Float(_)));
            let numeric = col
                .values
                .iter()
                .all(|v| matches!(v, Value::Empty | Value::Int(_) | Value::Float(_)));
            if !has_float || !numeric {
                continue;
            }
            for v in &mut col.values {
                if let Value::Int(i) = v {
                    *v = Value::Float(*i as f64);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            &["a", "b"],
            vec![
                vec![Value::Int(1), Value::from("x")],
                vec![Value::Int(2), Value::from("y")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse(""), Value::Empty);
        assert_eq!(Value::parse("42"), Value::Int(42));
        assert_eq!(Value::parse("2.8"), Value::Float(2.8));
        assert_eq!(Value::parse("True"), Value::Bool(true));
        assert_eq!(Value::parse("QC 4"), Value::Text("QC 4".to_string()));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Float(20.0).to_string(), "20.0");
        assert_eq!(Value::Float(2.8).to_string(), "2.8");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::Bool(false).to_string(), "False");
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("5.5").as_f64(), Some(5.5));
        assert!(Value::Empty.as_f64().unwrap().is_nan());
        assert_eq!(Value::from("QC").as_f64(), None);
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(Value::Int(2).natural_cmp(&Value::Int(10)), Ordering::Less);
        assert_eq!(Value::Int(10).natural_cmp(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::from("b").natural_cmp(&Value::from("a")), Ordering::Greater);
    }

    #[test]
    fn test_set_index_and_select_rows() {
        let mut table = sample();
        table.set_index("a").unwrap();
        assert_eq!(table.column_names(), vec!["b"]);
        assert_eq!(table.index, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(table.index_name.as_deref(), Some("a"));

        let picked = table.select_rows(&[1]);
        assert_eq!(picked.index, vec![Value::Int(2)]);
        assert_eq!(picked.row(0), vec![Value::from("y")]);
    }

    #[test]
    fn test_require_columns_lists_all_missing() {
        let table = sample();
        let err = table.require_columns(&["c", "a", "d"]).unwrap_err();
        assert_eq!(
            err,
            TableError::MissingColumns(vec!["c".to_string(), "d".to_string()])
        );
    }

    #[test]
    fn test_push_row_shape_mismatch() {
        let mut table = sample();
        let err = table.push_row(Value::Int(9), vec![Value::Int(1)]).unwrap_err();
        assert_eq!(err, TableError::ShapeMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_unify_numeric_columns() {
        let mut table = Table::from_rows(
            &["rt", "n"],
            vec![
                vec![Value::Float(2.8), Value::Int(1)],
                vec![Value::Int(3), Value::Int(2)],
            ],
        )
        .unwrap();
        table.unify_numeric_columns();
        assert_eq!(table.columns[0].values[1], Value::Float(3.0));
        assert_eq!(table.columns[1].values[1], Value::Int(2));
    }

    #[test]
    fn test_unify_numeric_columns_keeps_mixed_text_columns() {
        let mut table = Table::from_rows(
            &["101"],
            vec![
                vec![Value::from("QC")],
                vec![Value::Int(101)],
                vec![Value::Int(5)],
                vec![Value::Float(5.5)],
                vec![Value::Empty],
            ],
        )
        .unwrap();
        let before = table.clone();
        table.unify_numeric_columns();
        assert_eq!(table, before);
    }
}
