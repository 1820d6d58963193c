//! Scalar trait for meson-field element types.

use faer_traits::ComplexField;
use std::fmt::Debug;

pub use faer::c64;

/// Trait for scalar types a meson field can be accumulated in.
///
/// Wraps faer's `ComplexField` so kernels can hand workspace matrices
/// straight to faer's GEMM, plus the conversions the slice writers need.
pub trait Scalar: ComplexField + Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Element type tag written into slice file headers.
    const DTYPE: &'static str;

    /// Number of `f64` parts stored per element (1 for reals, 2 for complex).
    const PARTS: usize;

    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Split into real and imaginary parts (imaginary is zero for reals).
    fn to_re_im(self) -> (f64, f64);

    /// Rebuild from real and imaginary parts; real types drop the imaginary part.
    fn from_re_im(re: f64, im: f64) -> Self;
}

impl Scalar for f64 {
    const DTYPE: &'static str = "float64";
    const PARTS: usize = 1;

    fn one() -> Self {
        1.0
    }

    fn to_re_im(self) -> (f64, f64) {
        (self, 0.0)
    }

    fn from_re_im(re: f64, _im: f64) -> Self {
        re
    }
}

impl Scalar for c64 {
    const DTYPE: &'static str = "complex128";
    const PARTS: usize = 2;

    fn one() -> Self {
        c64::new(1.0, 0.0)
    }

    fn to_re_im(self) -> (f64, f64) {
        (self.re, self.im)
    }

    fn from_re_im(re: f64, im: f64) -> Self {
        c64::new(re, im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c64_is_not_real() {
        assert!(!<c64 as ComplexField>::IS_REAL);
        assert!(<f64 as ComplexField>::IS_REAL);
    }

    #[test]
    fn test_zero_one() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(c64::zero(), c64::new(0.0, 0.0));
        assert_eq!(c64::one(), c64::new(1.0, 0.0));
    }

    #[test]
    fn test_re_im_parts() {
        assert_eq!(c64::new(1.5, -2.0).to_re_im(), (1.5, -2.0));
        assert_eq!(c64::from_re_im(0.25, 3.0), c64::new(0.25, 3.0));
        assert_eq!(f64::from_re_im(4.0, 9.0), 4.0);
        assert_eq!(2.0_f64.to_re_im(), (2.0, 0.0));
    }
}
