//! Sparse (CSR-like) matrix used only during constraint-matrix assembly.
//!
//! LDPC/HDPC/G_ENC construction touches a handful of columns per row; a
//! dense representation at that stage would waste far more memory than the
//! eventual solver input does. `densify` is the one-shot bridge: it hands
//! ownership of an equivalent dense matrix to the solver, which needs dense
//! row operations for AXPY/GEMM throughput.

use crate::gf256;
use crate::matrix::Dense;

/// A sparse matrix stored as one sorted `(col, val)` list per row.
#[derive(Clone, Debug)]
pub struct Sparse {
    rows: usize,
    cols: usize,
    row_entries: Vec<Vec<(u32, u8)>>,
}

impl Sparse {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_entries: vec![Vec::new(); rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sets `A[row, col] = val`, keeping the row's entries sorted by
    /// column. Setting to 0 removes any existing entry.
    pub fn set(&mut self, row: usize, col: usize, val: u8) {
        let entries = &mut self.row_entries[row];
        match entries.binary_search_by_key(&(col as u32), |&(c, _)| c) {
            Ok(idx) => {
                if val == 0 {
                    entries.remove(idx);
                } else {
                    entries[idx].1 = val;
                }
            }
            Err(idx) => {
                if val != 0 {
                    entries.insert(idx, (col as u32, val));
                }
            }
        }
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        let entries = &self.row_entries[row];
        entries
            .binary_search_by_key(&(col as u32), |&(c, _)| c)
            .map(|idx| entries[idx].1)
            .unwrap_or(0)
    }

    /// Iterates the nonzero `(col, val)` pairs of a row, in ascending
    /// column order.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.row_entries[row]
            .iter()
            .map(|&(c, v)| (c as usize, v))
    }

    /// Writes an equivalent dense matrix, with the aligned stride `Dense`
    /// always uses. The previous two call sites in the reference
    /// implementation disagreed on whether the aligned stride was passed
    /// explicitly; this port has exactly one `densify` signature.
    pub fn densify(&self) -> Dense {
        let mut out = Dense::zeros(self.rows, self.cols);
        for r in 0..self.rows {
            for &(c, v) in &self.row_entries[r] {
                out.set(r, c as usize, v);
            }
        }
        out
    }

    /// Computes `self * rhs` directly into a dense result, without ever
    /// materializing `self` densely. Each output row is the GF(256)-weighted
    /// sum of the `rhs` rows named by that row's nonzero columns — the
    /// sparse-input counterpart to `Dense::gemm`, used where the left-hand
    /// side of a product is naturally sparse (HDPC's `MT`).
    pub fn gemm_into_dense(&self, rhs: &Dense) -> Dense {
        assert_eq!(self.cols, rhs.rows(), "gemm_into_dense: inner dimensions must match");
        let mut out = Dense::zeros(self.rows, rhs.cols());
        for r in 0..self.rows {
            for &(c, v) in &self.row_entries[r] {
                gf256::axpy(out.row_mut(r), rhs.row(c as usize), v);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut s = Sparse::new(3, 3);
        s.set(1, 2, 7);
        assert_eq!(s.get(1, 2), 7);
        assert_eq!(s.get(0, 0), 0);
    }

    #[test]
    fn set_zero_removes_entry() {
        let mut s = Sparse::new(2, 2);
        s.set(0, 0, 5);
        s.set(0, 0, 0);
        assert_eq!(s.get(0, 0), 0);
        assert_eq!(s.row_entries(0).count(), 0);
    }

    #[test]
    fn densify_matches_sparse() {
        let mut s = Sparse::new(2, 2);
        s.set(0, 1, 3);
        s.set(1, 0, 4);
        let d = s.densify();
        assert_eq!(d.get(0, 0), 0);
        assert_eq!(d.get(0, 1), 3);
        assert_eq!(d.get(1, 0), 4);
        assert_eq!(d.get(1, 1), 0);
    }

    #[test]
    fn row_entries_sorted_ascending() {
        let mut s = Sparse::new(1, 10);
        for c in [5, 1, 3, 9] {
            s.set(0, c, 1);
        }
        let cols: Vec<usize> = s.row_entries(0).map(|(c, _)| c).collect();
        assert_eq!(cols, vec![1, 3, 5, 9]);
    }

    #[test]
    fn gemm_into_dense_matches_densify_then_dense_gemm() {
        let mut s = Sparse::new(2, 3);
        s.set(0, 0, 1);
        s.set(0, 2, 3);
        s.set(1, 1, 5);

        let mut rhs = Dense::zeros(3, 2);
        rhs.set(0, 0, 1);
        rhs.set(0, 1, 2);
        rhs.set(1, 0, 3);
        rhs.set(1, 1, 4);
        rhs.set(2, 0, 5);
        rhs.set(2, 1, 6);

        let direct = s.gemm_into_dense(&rhs);
        let via_densify = Dense::gemm(&s.densify(), &rhs);
        assert_eq!(direct.row(0), via_densify.row(0));
        assert_eq!(direct.row(1), via_densify.row(1));
    }
}
