// src/core/call_graph/matrix.rs
use serde::{Deserialize, Serialize};

use crate::error::{FortmapError, Result};

/// Labeled 0/1 call matrix: rows are callees, columns are callers.
///
/// Built square by the assembler. Matrices loaded from CSV may have
/// different row and column labels; reordering works on either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    /// Row-major, `row_labels.len()` rows of `col_labels.len()` cells
    cells: Vec<Vec<u32>>,
}

impl AdjacencyMatrix {
    /// Zero matrix with `labels` on both axes
    pub fn square(labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            row_labels: labels.clone(),
            col_labels: labels,
            cells: vec![vec![0; n]; n],
        }
    }

    pub fn from_parts(row_labels: Vec<String>, col_labels: Vec<String>, cells: Vec<Vec<u32>>) -> Result<Self> {
        if cells.len() != row_labels.len() {
            return Err(FortmapError::MatrixFormat(format!(
                "{} row labels but {} rows",
                row_labels.len(),
                cells.len()
            )));
        }
        if let Some((i, row)) = cells.iter().enumerate().find(|(_, r)| r.len() != col_labels.len()) {
            return Err(FortmapError::MatrixFormat(format!(
                "row '{}' has {} cells, expected {}",
                row_labels[i],
                row.len(),
                col_labels.len()
            )));
        }

        Ok(Self { row_labels, col_labels, cells })
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.cells
    }

    pub fn is_square(&self) -> bool {
        self.row_labels == self.col_labels
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.row_labels.len()
    }

    fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|l| l == label)
    }

    fn col_index(&self, label: &str) -> Option<usize> {
        self.col_labels.iter().position(|l| l == label)
    }

    /// Cell value by labels; `None` when either label is unknown
    pub fn get(&self, row: &str, col: &str) -> Option<u32> {
        Some(self.cells[self.row_index(row)?][self.col_index(col)?])
    }

    pub(crate) fn set_by_index(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row][col] = value;
    }

    /// Times each row routine is called
    pub fn row_sums(&self) -> Vec<u64> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|&v| u64::from(v)).sum())
            .collect()
    }

    /// Number of callees of each column routine
    pub fn col_sums(&self) -> Vec<u64> {
        let mut sums = vec![0u64; self.col_labels.len()];
        for row in &self.cells {
            for (sum, &v) in sums.iter_mut().zip(row) {
                *sum += u64::from(v);
            }
        }
        sums
    }

    /// Number of non-zero cells
    pub fn edge_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// Reorder rows; `order[i]` is the old index of new row `i`
    pub fn permute_rows(&self, order: &[usize]) -> Self {
        Self {
            row_labels: order.iter().map(|&i| self.row_labels[i].clone()).collect(),
            col_labels: self.col_labels.clone(),
            cells: order.iter().map(|&i| self.cells[i].clone()).collect(),
        }
    }

    /// Reorder columns; `order[j]` is the old index of new column `j`
    pub fn permute_cols(&self, order: &[usize]) -> Self {
        Self {
            row_labels: self.row_labels.clone(),
            col_labels: order.iter().map(|&j| self.col_labels[j].clone()).collect(),
            cells: self
                .cells
                .iter()
                .map(|row| order.iter().map(|&j| row[j]).collect())
                .collect(),
        }
    }
}
