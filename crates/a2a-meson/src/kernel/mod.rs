//! Contraction kernels.
//!
//! A kernel turns one `(left-block, right-block)` pair of field samples into
//! the partial meson field for every momentum, operator and time slice. The
//! block engine only sees this interface; one implementation exists per
//! physics channel:
//!
//! ```text
//! A2AKernel<T, F> (trait)
//! ├── MesonKernel      - Wilson-type fermions, Dirac matrix insertion
//! └── StaggeredKernel  - staggered fermions, local or one-link insertion
//! ```

mod gemm;
mod meson;
mod staggered;

pub use meson::MesonKernel;
pub use staggered::{Insertion, StaggeredKernel};

use crate::error::{A2AError, Result};
use crate::matrix_set::MatrixSet;
use crate::scalar::Scalar;

/// Per-channel contraction of a left block against a right block.
///
/// Implementations hold only shared references to auxiliary data captured at
/// construction (gauge links, phase fields) and keep no state between calls,
/// so the same pair of blocks always yields the same values.
pub trait A2AKernel<T: Scalar, F> {
    /// Fill `out` with the contraction of `left` against `right`.
    ///
    /// `out` arrives zeroed and shaped `left.len() x right.len()`; its time
    /// extent is the length of the reduced axis.
    fn apply(&self, out: &mut MatrixSet<T>, left: &[F], right: &[F]) -> Result<()>;

    /// Floating-point operations for a `block_i x block_j` call.
    fn flops(&self, block_i: usize, block_j: usize) -> f64;

    /// Bytes moved for a `block_i x block_j` call.
    fn bytes(&self, block_i: usize, block_j: usize) -> f64;

    /// Size of the momentum set this kernel was built for.
    fn n_momenta(&self) -> usize;

    /// Size of the operator set this kernel was built for.
    fn n_operators(&self) -> usize;
}

/// Check that `out` matches the block and the kernel's index sets.
pub(crate) fn check_output<T: Scalar>(
    out: &MatrixSet<T>,
    n_left: usize,
    n_right: usize,
    n_momenta: usize,
    n_operators: usize,
    time_extent: usize,
) -> Result<()> {
    let checks = [
        ("output rows", n_left, out.rows()),
        ("output columns", n_right, out.cols()),
        ("output momenta", n_momenta, out.n_momenta()),
        ("output operators", n_operators, out.n_operators()),
        ("output time extent", time_extent, out.time_extent()),
    ];
    for (what, expected, actual) in checks {
        if expected != actual {
            return Err(A2AError::SizeMismatch {
                what,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
