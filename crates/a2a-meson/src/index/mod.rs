//! Logical index space of a meson-field computation.
//!
//! The output is a rank-5 tensor `(time, momentum, operator, left, right)`.
//! The (left, right) plane is tiled twice: outer blocks bound how many pairs
//! are held for one flush to the sink, cache blocks bound the tile a kernel
//! sees in one call.

mod block_dim;

pub use block_dim::BlockDim;

use crate::error::{A2AError, Result};

/// Extents and blocking parameters of one meson-field computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpace {
    time_extent: usize,
    n_momenta: usize,
    n_operators: usize,
    n_left: usize,
    n_right: usize,
    block: usize,
    cache_block: usize,
}

impl IndexSpace {
    /// Build an index space.
    ///
    /// # Errors
    ///
    /// Returns [`A2AError::Config`] if the time extent, the momentum or
    /// operator count, or either block size is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use a2a_meson::index::IndexSpace;
    ///
    /// let space = IndexSpace::new(8, 2, 3, 10, 6, 4, 16).unwrap();
    /// assert_eq!(space.block_size(), 4);
    /// // Cache blocks never exceed the outer block.
    /// assert_eq!(space.cache_block_size(), 4);
    /// assert_eq!(space.n_slices(), 6);
    /// ```
    pub fn new(
        time_extent: usize,
        n_momenta: usize,
        n_operators: usize,
        n_left: usize,
        n_right: usize,
        block: usize,
        cache_block: usize,
    ) -> Result<Self> {
        let positive = [
            ("time extent", time_extent),
            ("momentum count", n_momenta),
            ("operator count", n_operators),
            ("block size", block),
            ("cache block size", cache_block),
        ];
        for (what, value) in positive {
            if value == 0 {
                return Err(A2AError::config(format!("{what} must be positive")));
            }
        }
        Ok(Self {
            time_extent,
            n_momenta,
            n_operators,
            n_left,
            n_right,
            block,
            cache_block,
        })
    }

    #[inline]
    pub fn time_extent(&self) -> usize {
        self.time_extent
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
    pub fn n_left(&self) -> usize {
        self.n_left
    }

    #[inline]
    pub fn n_right(&self) -> usize {
        self.n_right
    }

    /// Same extents with the free indices replaced.
    pub fn with_vectors(mut self, n_left: usize, n_right: usize) -> Self {
        self.n_left = n_left;
        self.n_right = n_right;
        self
    }

    /// Outer block size, clamped to the larger free extent.
    pub fn block_size(&self) -> usize {
        self.block.min(self.n_left.max(self.n_right)).max(1)
    }

    /// Cache block size, clamped to the outer block size.
    pub fn cache_block_size(&self) -> usize {
        self.cache_block.min(self.block_size())
    }

    /// Outer blocks along the left index.
    pub fn left_blocks(&self) -> BlockDim {
        BlockDim::tiled(self.n_left, self.block_size())
    }

    /// Outer blocks along the right index.
    pub fn right_blocks(&self) -> BlockDim {
        BlockDim::tiled(self.n_right, self.block_size())
    }

    /// Cache blocks inside an outer block of `extent` rows or columns.
    pub fn cache_blocks(&self, extent: usize) -> BlockDim {
        BlockDim::tiled(extent, self.cache_block_size())
    }

    /// Number of `(momentum, operator)` output slices.
    #[inline]
    pub fn n_slices(&self) -> usize {
        self.n_momenta * self.n_operators
    }

    /// Elements in one complete `time x left x right` slice.
    #[inline]
    pub fn slice_len(&self) -> usize {
        self.time_extent * self.n_left * self.n_right
    }

    /// Elements in the whole rank-5 tensor.
    #[inline]
    pub fn tensor_len(&self) -> usize {
        self.n_slices() * self.slice_len()
    }
}
