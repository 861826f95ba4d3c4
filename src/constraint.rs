//! Constraint-matrix generation: LDPC1, the two identity blocks, LDPC2,
//! HDPC (`MT · Gamma`), and the G_ENC rows mapping intermediate symbols to
//! source/repair symbols. Assembly is sparse; the one-shot `densify` at
//! the end of `build` hands a dense matrix to the solver.

use crate::gf256::OCT_EXP;
use crate::matrix::Dense;
use crate::params::{self, PParams};
use crate::sparse::Sparse;

fn init_ldpc1(a: &mut Sparse, s: u32, b: u32) {
    for row in 0..s {
        for col in 0..b {
            let submtx = col / s;
            if row == col % s || row == (col + submtx + 1) % s || row == (col + 2 * (submtx + 1)) % s
            {
                a.set(row as usize, col as usize, 1);
            }
        }
    }
}

fn init_ldpc2(a: &mut Sparse, skip: u32, rows: u32, cols: u32) {
    if cols == 0 {
        return;
    }
    for row in 0..rows {
        let start = row % cols;
        for col in 0..cols {
            if col == start || col == (start + 1) % cols {
                a.set(row as usize, (skip + col) as usize, 1);
            }
        }
    }
}

fn add_identity(a: &mut Sparse, size: u32, skip_row: u32, skip_col: u32) {
    for diag in 0..size {
        a.set((skip_row + diag) as usize, (skip_col + diag) as usize, 1);
    }
}

fn make_mt(rows: u32, cols: u32) -> Sparse {
    let mut mt = Sparse::new(rows as usize, cols as usize);
    if cols == 0 {
        return mt;
    }
    for row in 0..rows {
        for col in 0..cols - 1 {
            let tmp = params::rnd(col + 1, 6, rows);
            let other = (tmp + params::rnd(col + 1, 7, rows.saturating_sub(1).max(1)) + 1) % rows;
            if row == tmp || row == other {
                mt.set(row as usize, col as usize, 1);
            }
        }
        mt.set(row as usize, (cols - 1) as usize, OCT_EXP[row as usize]);
    }
    mt
}

fn make_gamma(dim: u32) -> Dense {
    let mut gamma = Dense::zeros(dim as usize, dim as usize);
    for row in 0..dim {
        for col in 0..=row {
            gamma.set(row as usize, col as usize, OCT_EXP[((row - col) % 255) as usize]);
        }
    }
    gamma
}

fn init_hdpc(a: &mut Sparse, prm: &PParams) {
    let m = prm.h;
    let n = prm.k_padded + prm.s;
    if m == 0 || n == 0 {
        return;
    }
    let mt = make_mt(m, n);
    let gamma = make_gamma(n);
    let mtxgamma = mt.gemm_into_dense(&gamma);

    for col in 0..gamma.cols() {
        for row in 0..mt.rows() {
            let val = mtxgamma.get(row, col);
            if val != 0 {
                a.set(prm.s as usize + row, col, val);
            }
        }
    }
}

fn add_g_enc(a: &mut Sparse, prm: &PParams, overhead: u32) {
    for row in (prm.s + prm.h)..prm.l + overhead {
        let isi = row - prm.s - prm.h;
        for idx in params::indices(prm, isi) {
            a.set(row as usize, idx, 1);
        }
    }
}

/// Overwrites row `row` of an already-built matrix with the G_ENC pattern
/// for internal symbol identifier `isi`, as the decoder does to stand a
/// received repair symbol in for a missing source symbol (or to append
/// it as a genuinely extra, overhead row).
pub fn overwrite_row(a: &mut Dense, prm: &PParams, row: usize, isi: u32) {
    a.row_mut(row).fill(0);
    for idx in params::indices(prm, isi) {
        a.set(row, idx, 1);
    }
}

/// Builds the `(L + overhead) x L` constraint matrix for `prm`, densified
/// for the solver.
pub fn build(prm: &PParams, overhead: u32) -> Dense {
    let mut a = Sparse::new((prm.l + overhead) as usize, prm.l as usize);
    init_ldpc1(&mut a, prm.s, prm.b);
    add_identity(&mut a, prm.s, 0, prm.b);
    init_ldpc2(&mut a, prm.w, prm.s, prm.p);
    init_hdpc(&mut a, prm);
    add_identity(&mut a, prm.h, prm.s, prm.l - prm.h);
    add_g_enc(&mut a, prm, overhead);
    a.densify()
}
