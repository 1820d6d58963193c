//! Time-slice GEMM shared by the kernels.
//!
//! For one time slice with `k = sites * components` reduced elements the
//! meson-field matrix is `M = A * B`, with `A[i, k] = conj(left_i)` and
//! `B[k, j]` the right vectors after operator insertion and phase.

use std::ops::Range;

use faer::linalg::matmul::matmul;
use faer::{Accum, MatMut, MatRef, Par};

use crate::lattice::LatticeField;
use crate::scalar::{Scalar, c64};

/// `out = lhs * rhs` for column-major `rows x k` and `k x cols` operands.
pub(crate) fn gemm_into<T: Scalar>(
    out: &mut [T],
    lhs: &[T],
    rhs: &[T],
    rows: usize,
    cols: usize,
    k: usize,
) {
    let a = MatRef::from_column_major_slice(lhs, rows, k);
    let b = MatRef::from_column_major_slice(rhs, k, cols);
    let mut c = MatMut::from_column_major_slice_mut(out, rows, cols);
    matmul(c.as_mut(), Accum::Replace, a, b, T::one(), Par::Seq);
}

/// Scratch operands for one cache block, reused across time slices.
pub(crate) struct SliceOperands {
    pub rows: usize,
    pub cols: usize,
    pub k: usize,
    /// `rows x k`, conjugated left vectors.
    pub lhs: Vec<c64>,
    /// `k x cols`, right vectors after operator insertion.
    pub inserted: Vec<c64>,
    /// `k x cols`, inserted vectors times the momentum phase.
    pub rhs: Vec<c64>,
}

impl SliceOperands {
    pub fn new(rows: usize, cols: usize, k: usize) -> Self {
        let zero = c64::new(0.0, 0.0);
        Self {
            rows,
            cols,
            k,
            lhs: vec![zero; rows * k],
            inserted: vec![zero; k * cols],
            rhs: vec![zero; k * cols],
        }
    }

    /// Load `conj(left_i(x)_a)` for the sites of one time slice.
    pub fn load_left(&mut self, left: &[LatticeField<c64>], sites: Range<usize>) {
        for (i, field) in left.iter().enumerate() {
            let n_comp = field.n_comp();
            for (local, site) in sites.clone().enumerate() {
                for (a, v) in field.site(site).iter().enumerate() {
                    self.lhs[i + self.rows * (local * n_comp + a)] = v.conj();
                }
            }
        }
    }

    /// `rhs = phase(x) * inserted` where `phase` is one value per site.
    pub fn apply_phase(&mut self, phase: &[c64], n_comp: usize) {
        for j in 0..self.cols {
            let column = j * self.k;
            for (local, &ph) in phase.iter().enumerate() {
                for a in 0..n_comp {
                    let idx = column + local * n_comp + a;
                    self.rhs[idx] = ph * self.inserted[idx];
                }
            }
        }
    }

    /// `out = lhs * rhs`.
    pub fn multiply_into(&self, out: &mut [c64]) {
        gemm_into(out, &self.lhs, &self.rhs, self.rows, self.cols, self.k);
    }
}
