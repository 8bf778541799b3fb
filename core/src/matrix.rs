use crate::index::TermId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Borrowed view of a sparse vector: parallel, column-sorted index and value slices.
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    pub indices: &'a [TermId],
    pub values: &'a [f32],
}

impl<'a> SparseRow<'a> {
    pub fn dot(&self, other: &SparseRow<'_>) -> f64 {
        let mut sum = 0.0f64;
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                Ordering::Equal => {
                    sum += self.values[i] as f64 * other.values[j] as f64;
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| (*v as f64) * (*v as f64)).sum::<f64>().sqrt()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Owned sparse vector with column-sorted entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<TermId>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Build from unsorted (column, value) pairs; each column must appear once.
    pub fn from_entries(mut entries: Vec<(TermId, f32)>) -> Self {
        entries.sort_by_key(|(col, _)| *col);
        let (indices, values) = entries.into_iter().unzip();
        Self { indices, values }
    }

    pub fn as_row(&self) -> SparseRow<'_> {
        SparseRow { indices: &self.indices, values: &self.values }
    }

    pub fn l2_normalize(&mut self) {
        let norm = self.as_row().norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v = (*v as f64 / norm) as f32;
            }
        }
    }
}

/// Compressed sparse row matrix; row `i` occupies `indptr[i]..indptr[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<TermId>,
    data: Vec<f32>,
}

impl CsrMatrix {
    pub fn new(n_cols: usize) -> Self {
        Self { n_cols, indptr: vec![0], indices: Vec::new(), data: Vec::new() }
    }

    pub fn push_row(&mut self, row: &SparseVector) {
        debug_assert!(row.indices.iter().all(|c| (*c as usize) < self.n_cols));
        self.indices.extend_from_slice(&row.indices);
        self.data.extend_from_slice(&row.values);
        self.indptr.push(self.indices.len());
    }

    pub fn rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    pub fn cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn row(&self, i: usize) -> SparseRow<'_> {
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        SparseRow { indices: &self.indices[start..end], values: &self.data[start..end] }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = SparseRow<'_>> + '_ {
        (0..self.rows()).map(move |i| self.row(i))
    }

    /// Structural checks for a matrix read back from disk.
    pub fn is_well_formed(&self) -> bool {
        !self.indptr.is_empty()
            && self.indptr[0] == 0
            && self.indptr.windows(2).all(|w| w[0] <= w[1])
            && self.indptr.last().copied() == Some(self.indices.len())
            && self.indices.len() == self.data.len()
            && self.indices.iter().all(|c| (*c as usize) < self.n_cols)
    }
}
