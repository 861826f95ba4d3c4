//! Solves `A * C = D` over GF(256) for the intermediate symbols `C`.
//!
//! Phase 1 is the structured upper-triangulation described in
//! [`chooser`]: at each step a pivot row is chosen by degree (with the
//! HDPC/graph tie-break), its extra nonzero columns are compacted into a
//! growing dense region on the right, and its pivot column is eliminated
//! from every row below. Phase 2 runs ordinary Gauss-Jordan elimination
//! over that trailing dense region, using any surplus (overhead) rows for
//! pivoting. Phase 4 eliminates the remaining upper-right block directly
//! against the now-clean pivot rows from phases 1-2. Phase 5 finishes the
//! upper-left block via back-substitution, leaving `A`'s diagonal
//! un-normalized by design: only `D`'s rows are scaled, and `A` is never
//! read again afterward.
//!
//! The reference algorithm records phase 1's row operations in a tracked
//! matrix and replays them with a GEMM before back-substitution. Once
//! phases 1-2 leave every trailing pivot row as a clean unit vector,
//! eliminating the upper-right block directly against those rows performs
//! the identical elimination without carrying that extra tracking matrix.

use crate::chooser;
use crate::error::{Error, Result};
use crate::gf256;
use crate::matrix::Dense;

/// Solves `A * C = D`, given the half-open row range `[hdpc_start,
/// hdpc_end)` of `a` holding the HDPC rows (deprioritized by the Phase 1
/// chooser) and `p`, the initial width of the PI column region reserved
/// for Phase 2.
pub fn solve(
    a_input: &Dense,
    d_input: &Dense,
    hdpc_start: usize,
    hdpc_end: usize,
    p: usize,
) -> Result<Dense> {
    let l = a_input.cols();
    let m = a_input.rows();

    let mut a = a_input.clone();
    let mut d = d_input.clone();
    let mut is_hdpc: Vec<bool> = (0..m).map(|r| r >= hdpc_start && r < hdpc_end).collect();
    let mut c: Vec<usize> = (0..l).collect();

    let i = phase1(&mut a, &mut d, &mut is_hdpc, &mut c, l, m, p)?;
    phase2(&mut a, &mut d, i, m, l)?;
    phase4(&mut a, &mut d, i, l);
    phase5(&mut a, &mut d, i);

    let mut intermediate = Dense::zeros(l, d.cols());
    for row in 0..l {
        intermediate.set_row(c[row], d.row(row));
    }
    Ok(intermediate)
}

/// Structured upper-triangulation. Returns the number of rows finalized,
/// `i`, which also marks where the trailing dense region begins.
fn phase1(
    a: &mut Dense,
    d: &mut Dense,
    is_hdpc: &mut [bool],
    c: &mut [usize],
    l: usize,
    m: usize,
    p: usize,
) -> Result<usize> {
    let mut i = 0usize;
    let mut u = p;

    while i + u < l {
        let sub_cols = l - u;
        let pick = chooser::choose(a, i, m, sub_cols, is_hdpc).ok_or_else(|| {
            log::warn!("phase1: no nonzero row among {} remaining, received set is rank-deficient", m - i);
            Error::Singular
        })?;

        log::trace!("phase1: pivot row {} degree {} at step {i}", pick.row, pick.degree);

        if pick.row != i {
            a.swap_row(i, pick.row);
            d.swap_row(i, pick.row);
            is_hdpc.swap(i, pick.row);
        }

        if a.get(i, i) == 0 {
            if let Some(col) = (i..sub_cols).find(|&col| a.get(i, col) != 0) {
                a.swap_col(i, col);
                c.swap(i, col);
            }
        }

        // Compact the pivot row's other active nonzero columns rightward,
        // shrinking the active window by exactly (degree - 1) so the next
        // step's chooser only ever sees the still-unclaimed columns.
        let mut extra_cols: Vec<usize> =
            (i + 1..sub_cols).filter(|&col| a.get(i, col) != 0).collect();
        extra_cols.sort_unstable_by(|x, y| y.cmp(x));
        let mut boundary = sub_cols;
        for &col in &extra_cols {
            boundary -= 1;
            if col != boundary {
                a.swap_col(col, boundary);
                c.swap(col, boundary);
            }
        }

        let pivot = a.get(i, i);
        for row in (i + 1)..m {
            let coeff = a.get(row, i);
            if coeff == 0 {
                continue;
            }
            let multiple = gf256::div(coeff, pivot);
            if multiple == 0 {
                continue;
            }
            a.axpy(row, i, multiple);
            d.axpy(row, i, multiple);
        }

        u += pick.degree as usize - 1;
        i += 1;
    }

    Ok(i)
}

/// Dense Gauss-Jordan elimination over rows `[i, m)`, columns `[i, l)`,
/// using any surplus rows beyond the square `u x u` block for pivoting.
fn phase2(a: &mut Dense, d: &mut Dense, i: usize, m: usize, l: usize) -> Result<()> {
    for diag in i..l {
        let pivot_row = (diag..m)
            .find(|&r| a.get(r, diag) != 0)
            .ok_or(Error::Singular)?;
        if pivot_row != diag {
            a.swap_row(diag, pivot_row);
            d.swap_row(diag, pivot_row);
        }

        let pivot_val = a.get(diag, diag);
        if pivot_val != 1 {
            let inv = gf256::div(1, pivot_val);
            a.scal(diag, inv);
            d.scal(diag, inv);
        }

        for row in i..m {
            if row == diag {
                continue;
            }
            let coeff = a.get(row, diag);
            if coeff == 0 {
                continue;
            }
            a.axpy(row, diag, coeff);
            d.axpy(row, diag, coeff);
        }
    }
    Ok(())
}

/// Eliminates the upper-right block (rows `[0, i)`, columns `[i, l)`)
/// directly against the clean pivot rows phases 1-2 established there.
fn phase4(a: &mut Dense, d: &mut Dense, i: usize, l: usize) {
    for row in 0..i {
        for col in i..l {
            let coeff = a.get(row, col);
            if coeff == 0 {
                continue;
            }
            a.axpy(row, col, coeff);
            d.axpy(row, col, coeff);
        }
    }
}

/// Back-substitution over the upper-triangular `i x i` block. Only `D`'s
/// rows are scaled by the pivot's inverse; `A`'s diagonal is left as-is
/// and is not read again after this.
fn phase5(a: &mut Dense, d: &mut Dense, i: usize) {
    for j in (0..i).rev() {
        let diag = a.get(j, j);
        if diag != 1 {
            let inv = gf256::div(1, diag);
            d.scal(j, inv);
        }
        for l in 0..j {
            let coeff = a.get(l, j);
            if coeff == 0 {
                continue;
            }
            d.axpy(l, j, coeff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_system(n: usize, cols: usize) -> (Dense, Dense) {
        let mut a = Dense::zeros(n, n);
        for i in 0..n {
            a.set(i, i, 1);
        }
        let mut d = Dense::zeros(n, cols);
        for i in 0..n {
            for c in 0..cols {
                d.set(i, c, ((i + c + 1) % 251) as u8);
            }
        }
        (a, d)
    }

    #[test]
    fn identity_system_solves_to_itself() {
        let (a, d) = identity_system(6, 3);
        let c = solve(&a, &d, 0, 0, 0).unwrap();
        for r in 0..6 {
            assert_eq!(c.row(r), d.row(r));
        }
    }

    #[test]
    fn permuted_identity_solves_correctly() {
        let mut a = Dense::zeros(4, 4);
        // row i encodes x_{perm[i]} = d[i]
        let perm = [3usize, 1, 0, 2];
        for (row, &col) in perm.iter().enumerate() {
            a.set(row, col, 1);
        }
        let mut d = Dense::zeros(4, 2);
        for r in 0..4 {
            d.set(r, 0, (r as u8) + 10);
            d.set(r, 1, (r as u8) + 20);
        }
        let c = solve(&a, &d, 0, 0, 0).unwrap();
        for (row, &col) in perm.iter().enumerate() {
            assert_eq!(c.row(col), d.row(row));
        }
    }

    #[test]
    fn redundant_rows_do_not_break_solving() {
        // 2 unknowns, 3 equations (one is a duplicate row) -> overhead = 1.
        let mut a = Dense::zeros(3, 2);
        a.set(0, 0, 1);
        a.set(1, 1, 1);
        a.set(2, 1, 1);
        let mut d = Dense::zeros(3, 1);
        d.set(0, 0, 7);
        d.set(1, 0, 9);
        d.set(2, 0, 9);
        let c = solve(&a, &d, 5, 5, 0).unwrap();
        assert_eq!(c.get(0, 0), 7);
        assert_eq!(c.get(1, 0), 9);
    }

    #[test]
    fn all_zero_row_is_singular() {
        let a = Dense::zeros(2, 2);
        let d = Dense::zeros(2, 1);
        assert!(matches!(solve(&a, &d, 0, 0, 0), Err(Error::Singular)));
    }
}
