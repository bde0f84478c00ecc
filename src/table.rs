// Column-oriented stat table: the tabular input/output of the validator.
//
// Rows come from heterogeneous sources (Statcast pitch feeds, box scores,
// season stat dumps), so every cell is optional. Columns keep their insertion
// order and are looked up by name.

use std::fmt;

/// A single named column: either numeric or text. All columns in a table have
/// the same length (one entry per row).
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered table of named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    columns: Vec<(String, Column)>,
    rows: usize,
}

/// Attempt to add a column whose length disagrees with the table's row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthMismatch {
    pub column: String,
    pub expected: usize,
    pub got: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column `{}` has {} rows, table has {}",
            self.column, self.got, self.expected
        )
    }
}

impl std::error::Error for LengthMismatch {}

impl StatTable {
    /// Create an empty table (zero rows, zero columns).
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows. The first column added fixes this; later columns must
    /// match it.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the table holds no rows (a table with columns but zero rows
    /// is also considered empty).
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Add (or replace) a numeric column.
    pub fn set_float_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), LengthMismatch> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.put(name, Column::Float(values));
        Ok(())
    }

    /// Add (or replace) a text column.
    pub fn set_text_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<String>>,
    ) -> Result<(), LengthMismatch> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.put(name, Column::Text(values));
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Numeric column values, or None if the column is missing or textual.
    pub fn float_column(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.column(name) {
            Some(Column::Float(v)) => Some(v),
            _ => None,
        }
    }

    pub fn float_column_mut(&mut self, name: &str) -> Option<&mut Vec<Option<f64>>> {
        match self
            .columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
        {
            Some(Column::Float(v)) => Some(v),
            _ => None,
        }
    }

    /// Text column values, or None if the column is missing or numeric.
    pub fn text_column(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name) {
            Some(Column::Text(v)) => Some(v),
            _ => None,
        }
    }

    fn check_len(&self, name: &str, len: usize) -> Result<(), LengthMismatch> {
        if self.columns.is_empty() || len == self.rows {
            return Ok(());
        }
        Err(LengthMismatch {
            column: name.to_string(),
            expected: self.rows,
            got: len,
        })
    }

    fn put(&mut self, name: String, column: Column) {
        if self.columns.is_empty() {
            self.rows = column.len();
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
    }
}

/// Convenience builder for tests and fixture construction.
#[derive(Debug, Default)]
pub struct StatTableBuilder {
    table: StatTable,
}

impl StatTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn floats(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        self.table
            .set_float_column(name, values)
            .expect("builder column length mismatch");
        self
    }

    pub fn texts(mut self, name: &str, values: Vec<&str>) -> Self {
        self.table
            .set_text_column(name, values.into_iter().map(|s| Some(s.to_string())).collect())
            .expect("builder column length mismatch");
        self
    }

    pub fn build(self) -> StatTable {
        self.table
    }
}
