//! Time-indexed table of named numeric columns
//!
//! A [`Frame`] is the in-memory input of an evaluation: one row per
//! timestamp, one `f64` value per named column. The index must be
//! non-decreasing; duplicate timestamps are allowed.

use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building or reading a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Frame has no rows")]
    Empty,

    #[error("Shape mismatch: {rows} index entries, {columns} column names, values are {value_rows}x{value_cols}")]
    ShapeMismatch {
        rows: usize,
        columns: usize,
        value_rows: usize,
        value_cols: usize,
    },

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Column '{name}' has length {got}, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Non-finite value {value} in column '{column}' at row {row}")]
    NonFinite {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("Index is not chronological: row {row} ({at}) precedes row {prev_row} ({prev})")]
    UnsortedIndex {
        row: usize,
        at: NaiveDateTime,
        prev_row: usize,
        prev: NaiveDateTime,
    },
}

/// Chronologically indexed table with named `f64` columns
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Vec<NaiveDateTime>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl Frame {
    /// Create a frame from an index, column names and a row-major value matrix
    ///
    /// Fails if the shapes disagree, a column name repeats, a value is NaN or
    /// infinite, or the index goes backwards in time.
    pub fn new(
        index: Vec<NaiveDateTime>,
        columns: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, FrameError> {
        if values.nrows() != index.len() || values.ncols() != columns.len() {
            return Err(FrameError::ShapeMismatch {
                rows: index.len(),
                columns: columns.len(),
                value_rows: values.nrows(),
                value_cols: values.ncols(),
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(FrameError::DuplicateColumn(name.clone()));
            }
        }

        for (j, column) in values.axis_iter(Axis(1)).enumerate() {
            if let Some((row, &value)) = column.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(FrameError::NonFinite {
                    column: columns[j].clone(),
                    row,
                    value,
                });
            }
        }

        if let Some(row) = (1..index.len()).find(|&i| index[i] < index[i - 1]) {
            return Err(FrameError::UnsortedIndex {
                row,
                at: index[row],
                prev_row: row - 1,
                prev: index[row - 1],
            });
        }

        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Create a frame from `(name, values)` column pairs
    pub fn from_columns<S: Into<String>>(
        index: Vec<NaiveDateTime>,
        columns: Vec<(S, Vec<f64>)>,
    ) -> Result<Self, FrameError> {
        let n_rows = index.len();
        let mut names = Vec::with_capacity(columns.len());
        let mut values = Array2::<f64>::zeros((n_rows, columns.len()));

        for (j, (name, data)) in columns.into_iter().enumerate() {
            let name = name.into();
            if data.len() != n_rows {
                return Err(FrameError::ColumnLength {
                    name,
                    expected: n_rows,
                    got: data.len(),
                });
            }
            values.column_mut(j).assign(&Array1::from_vec(data));
            names.push(name);
        }

        Self::new(index, names, values)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in storage order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Timestamp index
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Raw value matrix (rows x columns)
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Position of a column by name
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Borrow one column by name
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>, FrameError> {
        let j = self
            .column_position(name)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))?;
        Ok(self.values.column(j))
    }
}
