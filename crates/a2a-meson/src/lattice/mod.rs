//! Lattice geometry and fields.
//!
//! A minimal stand-in for the distributed grid layer: global extents with
//! time as the last axis, periodic neighbours, and flat site-major fields.
//! The engine itself only ever sees fields through a kernel.

mod field;
mod phase;

pub use field::{
    COLOURS, ComplexField, FermionField, GaugeField, LatticeField, RandomNormal, SPINS,
    StaggeredField, WILSON_COMPONENTS,
};
pub use phase::{MomentumPhaseCache, momentum_phase, parse_momentum};

use std::ops::Range;

use crate::error::{A2AError, Result};
use crate::strides::{compute_strides, coordinate_to_index, index_to_coordinate};

/// Global lattice geometry.
///
/// Sites are numbered column-major (x fastest, time slowest), so the sites of
/// one time slice form the contiguous range [`Lattice::time_slice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    dims: Vec<usize>,
    strides: Vec<usize>,
    volume: usize,
}

impl Lattice {
    /// Create a lattice from its global extents, time last.
    ///
    /// # Errors
    ///
    /// Returns [`A2AError::Config`] for an empty shape or a zero extent.
    ///
    /// # Example
    ///
    /// ```
    /// use a2a_meson::lattice::Lattice;
    ///
    /// let lattice = Lattice::new(&[4, 4, 4, 8]).unwrap();
    /// assert_eq!(lattice.nd(), 4);
    /// assert_eq!(lattice.time_extent(), 8);
    /// assert_eq!(lattice.slice_volume(), 64);
    /// assert_eq!(lattice.time_slice(1), 64..128);
    /// ```
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Err(A2AError::config("lattice needs at least one dimension"));
        }
        if let Some(mu) = dims.iter().position(|&l| l == 0) {
            return Err(A2AError::config(format!("lattice extent {mu} is zero")));
        }
        Ok(Self {
            dims: dims.to_vec(),
            strides: compute_strides(dims),
            volume: dims.iter().product(),
        })
    }

    /// Number of dimensions.
    #[inline]
    pub fn nd(&self) -> usize {
        self.dims.len()
    }

    /// Global extents.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Extent along `mu`.
    #[inline]
    pub fn dim(&self, mu: usize) -> usize {
        self.dims[mu]
    }

    /// Total number of sites.
    #[inline]
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Extent of the time (last) axis.
    #[inline]
    pub fn time_extent(&self) -> usize {
        self.dims[self.dims.len() - 1]
    }

    /// Sites per time slice.
    #[inline]
    pub fn slice_volume(&self) -> usize {
        self.volume / self.time_extent()
    }

    /// Contiguous site range of time slice `t`.
    #[inline]
    pub fn time_slice(&self, t: usize) -> Range<usize> {
        let sv = self.slice_volume();
        t * sv..(t + 1) * sv
    }

    /// Full coordinate of a site.
    pub fn coordinate(&self, site: usize) -> Vec<usize> {
        index_to_coordinate(site, &self.dims)
    }

    /// Component `mu` of the coordinate of a site.
    #[inline]
    pub fn coordinate_component(&self, site: usize, mu: usize) -> usize {
        (site / self.strides[mu]) % self.dims[mu]
    }

    /// Site index of a coordinate (components must lie inside the lattice).
    #[inline]
    pub fn site(&self, coord: &[usize]) -> usize {
        debug_assert_eq!(coord.len(), self.nd());
        coordinate_to_index(coord, &self.strides)
    }

    /// Periodic neighbour of `site` displaced by `step` along `mu`.
    pub fn neighbor(&self, site: usize, mu: usize, step: isize) -> usize {
        let l = self.dims[mu] as isize;
        let x = self.coordinate_component(site, mu) as isize;
        let shifted = (x + step).rem_euclid(l) as usize;
        site - (x as usize) * self.strides[mu] + shifted * self.strides[mu]
    }
}
