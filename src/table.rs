//! Labeled numeric matrices
//!
//! A `LabeledMatrix` is a fixed-size, row-major table of `f64` values with
//! ordered row and column labels. Construction validates that the data length
//! matches the declared shape and that label counts match the dimensions.
//!
//! `NaN` entries are allowed and mean "missing".

use crate::error::{CorrPlotError, Result};
use polars::prelude::*;

/// Fixed-size 2-D numeric table with row and column labels
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMatrix {
    values: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
}

/// Square table of correlation coefficients
pub type CorrelationMatrix = LabeledMatrix;

/// Square table of p-values, paired index-for-index with a `CorrelationMatrix`
pub type SignificanceMatrix = LabeledMatrix;

/// Default labels "0", "1", ... (positional index)
fn index_labels(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

impl LabeledMatrix {
    /// Create from row-major values with explicit labels
    pub fn new(
        values: Vec<f64>,
        n_rows: usize,
        n_cols: usize,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
    ) -> Result<Self> {
        if values.len() != n_rows * n_cols {
            return Err(CorrPlotError::Shape(format!(
                "expected {} values for a {}x{} matrix, got {}",
                n_rows * n_cols,
                n_rows,
                n_cols,
                values.len()
            )));
        }
        if row_labels.len() != n_rows {
            return Err(CorrPlotError::Shape(format!(
                "{} row labels for {} rows",
                row_labels.len(),
                n_rows
            )));
        }
        if col_labels.len() != n_cols {
            return Err(CorrPlotError::Shape(format!(
                "{} column labels for {} columns",
                col_labels.len(),
                n_cols
            )));
        }

        Ok(Self {
            values,
            n_rows,
            n_cols,
            row_labels,
            col_labels,
        })
    }

    /// Create from nested rows, labeling rows and columns by position
    ///
    /// All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);

        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(CorrPlotError::Shape(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                n_cols
            )));
        }

        let values = rows.iter().flatten().copied().collect();
        Self::new(
            values,
            n_rows,
            n_cols,
            index_labels(n_rows),
            index_labels(n_cols),
        )
    }

    /// Create a square matrix whose rows and columns share the same labels
    pub fn square(values: Vec<f64>, labels: Vec<String>) -> Result<Self> {
        let n = labels.len();
        Self::new(values, n, n, labels.clone(), labels)
    }

    /// Replace row and column labels (counts must match the shape)
    pub fn with_labels(self, row_labels: Vec<String>, col_labels: Vec<String>) -> Result<Self> {
        Self::new(self.values, self.n_rows, self.n_cols, row_labels, col_labels)
    }

    /// Build from a Polars DataFrame
    ///
    /// Every column is cast to Float64; nulls become `NaN`. Column names become
    /// column labels. Row labels are taken from `row_labels` when given,
    /// otherwise the column names are reused (correlation matrices label both
    /// axes with the same variables), or positional labels when the frame is
    /// not square.
    pub fn from_dataframe(df: &DataFrame, row_labels: Option<Vec<String>>) -> Result<Self> {
        let n_rows = df.height();
        let n_cols = df.width();

        let mut col_labels = Vec::with_capacity(n_cols);
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(n_cols);

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            col_labels.push(series.name().to_string());

            let casted = series.cast(&DataType::Float64)?;
            let values: Vec<f64> = casted
                .f64()?
                .into_iter()
                .map(|opt| opt.unwrap_or(f64::NAN))
                .collect();
            columns.push(values);
        }

        // Column-major -> row-major
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            for column in &columns {
                values.push(column[i]);
            }
        }

        let row_labels = match row_labels {
            Some(labels) => labels,
            None if n_rows == n_cols => col_labels.clone(),
            None => index_labels(n_rows),
        };

        Self::new(values, n_rows, n_cols, row_labels, col_labels)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn is_square(&self) -> bool {
        self.n_rows == self.n_cols
    }

    /// Row-major values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at (row, col), None when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n_rows && col < self.n_cols {
            Some(self.values[row * self.n_cols + col])
        } else {
            None
        }
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Check the matrix is square and non-empty, returning its side length
    pub fn ensure_square(&self) -> Result<usize> {
        if !self.is_square() {
            return Err(CorrPlotError::Shape(format!(
                "matrix must be square, got {}x{}",
                self.n_rows, self.n_cols
            )));
        }
        if self.n_rows == 0 {
            return Err(CorrPlotError::Shape("matrix is empty".to_string()));
        }
        Ok(self.n_rows)
    }

    /// Check that `other` has exactly the same shape as `self`
    pub fn ensure_same_shape(&self, other: &LabeledMatrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(CorrPlotError::Shape(format!(
                "shape mismatch: {}x{} vs {}x{}",
                self.n_rows, self.n_cols, other.n_rows, other.n_cols
            )));
        }
        Ok(())
    }
}
