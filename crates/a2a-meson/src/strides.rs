//! Column-major index arithmetic.
//!
//! Lattice sites and workspace buffers both use column-major (Fortran) order:
//! the first axis runs fastest. For a lattice that puts time last, every
//! time slice is a contiguous run of sites.

/// Compute column-major strides from a shape.
///
/// For shape [d0, d1, d2, ...], returns strides [1, d0, d0*d1, ...].
///
/// # Examples
///
/// ```
/// use a2a_meson::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[4, 4, 4, 8]), vec![1, 4, 16, 64]);
/// assert_eq!(compute_strides(&[5]), vec![1]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut stride = 1;
    for &dim in shape {
        strides.push(stride);
        stride *= dim;
    }
    strides
}

/// Linear offset of a multi-index.
#[inline]
pub fn coordinate_to_index(coord: &[usize], strides: &[usize]) -> usize {
    coord
        .iter()
        .zip(strides)
        .map(|(&x, &stride)| x * stride)
        .sum()
}

/// Multi-index of a linear offset within `shape`.
pub fn index_to_coordinate(mut index: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = Vec::with_capacity(shape.len());
    for &dim in shape {
        coord.push(index % dim);
        index /= dim;
    }
    coord
}
