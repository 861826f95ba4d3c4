//! Row selection for Phase 1 of structured Gaussian elimination.
//!
//! At each step the active sub-matrix is the first `sub_cols` columns of
//! the not-yet-processed rows `[i, m)`. The row to pivot on next is chosen
//! by (1) finding `r`, the minimum positive count of nonzero entries among
//! those rows restricted to the active columns, then (2) if `r == 2`,
//! preferring a non-HDPC row whose two nonzero columns fall in the largest
//! connected component of the graph formed by all degree-2 non-HDPC rows,
//! else (3) falling back to any row achieving `r`, preferring non-HDPC,
//! lowest row index first.

use crate::graph::Graph;
use crate::matrix::Dense;

struct RowDegree {
    degree: u32,
    first_col: Option<usize>,
}

fn row_active_degree(a: &Dense, row: usize, sub_cols: usize) -> RowDegree {
    let mut degree = 0;
    let mut first_col = None;
    for c in 0..sub_cols {
        if a.get(row, c) != 0 {
            degree += 1;
            if first_col.is_none() {
                first_col = Some(c);
            }
        }
    }
    RowDegree { degree, first_col }
}

/// The selected pivot row and the active degree it was chosen at.
pub struct Pick {
    pub row: usize,
    pub degree: u32,
}

/// Picks the next pivot row from `[i, m)`, or `None` if every row in that
/// range is all-zero across the active columns (the system is singular).
pub fn choose(a: &Dense, i: usize, m: usize, sub_cols: usize, is_hdpc: &[bool]) -> Option<Pick> {
    if i >= m || sub_cols == 0 {
        return None;
    }

    let degrees: Vec<u32> = (i..m)
        .map(|row| row_active_degree(a, row, sub_cols).degree)
        .collect();
    let min_degree = degrees.iter().copied().filter(|&d| d > 0).min()?;

    if min_degree == 2 {
        let mut graph = Graph::new(sub_cols);
        for (idx, &d) in degrees.iter().enumerate() {
            let row = i + idx;
            if d == 2 && !is_hdpc[row] {
                let rd = row_active_degree(a, row, sub_cols);
                let c1 = rd.first_col.unwrap();
                let c2 = (c1 + 1..sub_cols).find(|&c| a.get(row, c) != 0).unwrap();
                graph.add_edge(c1, c2);
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (idx, &d) in degrees.iter().enumerate() {
            let row = i + idx;
            if d == 2 && !is_hdpc[row] {
                let c1 = row_active_degree(a, row, sub_cols).first_col.unwrap();
                let size = graph.component_size(c1);
                if best.is_none_or(|(best_size, _)| size > best_size) {
                    best = Some((size, row));
                }
            }
        }
        if let Some((_, row)) = best {
            return Some(Pick { row, degree: 2 });
        }
    }

    let mut fallback: Option<usize> = None;
    for (idx, &d) in degrees.iter().enumerate() {
        if d != min_degree {
            continue;
        }
        let row = i + idx;
        if !is_hdpc[row] {
            fallback = Some(row);
            break;
        }
        fallback.get_or_insert(row);
    }
    fallback.map(|row| Pick { row, degree: min_degree })
}
