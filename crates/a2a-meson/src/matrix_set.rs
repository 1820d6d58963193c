//! Dense workspace holding one block of the rank-5 meson-field tensor.
//!
//! Layout is column-major over `[rows, cols, time, operator, momentum]`:
//!
//! ```text
//! offset(i, j, t, g, m) = i + rows * (j + cols * (t + nt * (g + nop * m)))
//! ```
//!
//! so every `(m, g, t)` matrix is a contiguous column-major `rows x cols`
//! matrix (ready for faer) and every `(m, g)` slice is one contiguous run.

use crate::scalar::Scalar;
use crate::storage::Dense;

/// One `(left-block x right-block)` tile for all times, operators and momenta.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSet<T: Scalar> {
    n_momenta: usize,
    n_operators: usize,
    time_extent: usize,
    rows: usize,
    cols: usize,
    storage: Dense<T>,
}

impl<T: Scalar> MatrixSet<T> {
    /// Zero-initialized set.
    pub fn new(
        n_momenta: usize,
        n_operators: usize,
        time_extent: usize,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            n_momenta,
            n_operators,
            time_extent,
            rows,
            cols,
            storage: Dense::zeros(n_momenta * n_operators * time_extent * rows * cols),
        }
    }

    /// Change the tile shape and zero the contents, reusing the allocation.
    pub fn reshape(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.storage
            .resize_zeroed(self.n_momenta * self.n_operators * self.time_extent * rows * cols);
    }

    #[inline]
    pub fn n_momenta(&self) -> usize {
        self.n_momenta
    }

    #[inline]
    pub fn n_operators(&self) -> usize {
        self.n_operators
    }

    #[inline]
    pub fn time_extent(&self) -> usize {
        self.time_extent
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn slice_len(&self) -> usize {
        self.rows * self.cols * self.time_extent
    }

    #[inline]
    fn matrix_offset(&self, m: usize, g: usize, t: usize) -> usize {
        debug_assert!(m < self.n_momenta && g < self.n_operators && t < self.time_extent);
        ((m * self.n_operators + g) * self.time_extent + t) * self.rows * self.cols
    }

    /// The `rows x cols` matrix for `(momentum, operator, time)`, column-major.
    pub fn matrix(&self, m: usize, g: usize, t: usize) -> &[T] {
        let start = self.matrix_offset(m, g, t);
        &self.storage.as_slice()[start..start + self.rows * self.cols]
    }

    /// Mutable matrix for `(momentum, operator, time)`, column-major.
    pub fn matrix_mut(&mut self, m: usize, g: usize, t: usize) -> &mut [T] {
        let start = self.matrix_offset(m, g, t);
        let len = self.rows * self.cols;
        &mut self.storage.as_mut_slice()[start..start + len]
    }

    /// All times of the `(momentum, operator)` slice, layout `[rows, cols, time]`.
    pub fn slice(&self, m: usize, g: usize) -> &[T] {
        let start = (m * self.n_operators + g) * self.slice_len();
        &self.storage.as_slice()[start..start + self.slice_len()]
    }

    /// Element `(m, g, t, i, j)`.
    #[inline]
    pub fn get(&self, m: usize, g: usize, t: usize, i: usize, j: usize) -> T {
        self.matrix(m, g, t)[i + self.rows * j]
    }

    /// Set element `(m, g, t, i, j)`.
    #[inline]
    pub fn set(&mut self, m: usize, g: usize, t: usize, i: usize, j: usize, value: T) {
        let rows = self.rows;
        self.matrix_mut(m, g, t)[i + rows * j] = value;
    }

    /// Raw storage.
    #[inline]
    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Copy this tile into `dest` with its top-left corner at `(row_offset, col_offset)`.
    ///
    /// # Panics
    /// Panics if the tile does not fit or the momentum/operator/time extents differ.
    pub fn copy_into(&self, dest: &mut MatrixSet<T>, row_offset: usize, col_offset: usize) {
        assert!(row_offset + self.rows <= dest.rows && col_offset + self.cols <= dest.cols);
        assert_eq!(
            (self.n_momenta, self.n_operators, self.time_extent),
            (dest.n_momenta, dest.n_operators, dest.time_extent),
            "matrix sets have different outer extents"
        );
        if self.rows == 0 {
            return;
        }
        let dest_rows = dest.rows;
        for m in 0..self.n_momenta {
            for g in 0..self.n_operators {
                for t in 0..self.time_extent {
                    let src = self.matrix(m, g, t);
                    let dst = dest.matrix_mut(m, g, t);
                    for (j, column) in src.chunks_exact(self.rows).enumerate() {
                        let start = row_offset + dest_rows * (col_offset + j);
                        dst[start..start + self.rows].copy_from_slice(column);
                    }
                }
            }
        }
    }
}
