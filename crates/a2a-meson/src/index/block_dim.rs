//! BlockDim: tiling of one free index into contiguous blocks.

use std::ops::Range;

/// Block structure of one free index (left or right vector position).
///
/// [`BlockDim::tiled`] gives equal blocks with a shorter ragged tail; it never pads.
///
/// # Example
/// ```
/// use a2a_meson::index::BlockDim;
///
/// let dim = BlockDim::tiled(10, 4);
/// assert_eq!(dim.nblocks(), 3);
/// assert_eq!(dim.block_sizes(), &[4, 4, 2]);
/// assert_eq!(dim.ranges().last(), Some(8..10));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDim {
    block_sizes: Vec<usize>,
    /// cumulative[i] = sum of block_sizes[0..i]
    cumulative: Vec<usize>,
}

impl BlockDim {
    /// Tile `extent` into blocks of `block` elements, the last one clamped.
    ///
    /// # Panics
    /// Panics if `block == 0`.
    pub fn tiled(extent: usize, block: usize) -> Self {
        assert!(block > 0, "block size must be positive");
        let block_sizes: Vec<usize> = (0..extent)
            .step_by(block)
            .map(|start| block.min(extent - start))
            .collect();
        let cumulative = std::iter::once(0)
            .chain((0..extent).step_by(block).skip(1))
            .chain((extent > 0).then_some(extent))
            .collect();
        Self {
            block_sizes,
            cumulative,
        }
    }

    /// Number of blocks.
    #[inline]
    pub fn nblocks(&self) -> usize {
        self.block_sizes.len()
    }

    /// All block sizes.
    #[inline]
    pub fn block_sizes(&self) -> &[usize] {
        &self.block_sizes
    }

    /// Iterate over the block ranges in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.cumulative.windows(2).map(|w| w[0]..w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiled_even() {
        let dim = BlockDim::tiled(8, 4);
        assert_eq!(dim.block_sizes(), &[4, 4]);
        assert_eq!(dim.ranges().collect::<Vec<_>>(), vec![0..4, 4..8]);
    }

    #[test]
    fn test_tiled_ragged_tail() {
        let dim = BlockDim::tiled(7, 3);
        assert_eq!(dim.block_sizes(), &[3, 3, 1]);
        assert_eq!(dim.ranges().collect::<Vec<_>>(), vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn test_tiled_block_larger_than_extent() {
        let dim = BlockDim::tiled(3, 16);
        assert_eq!(dim.block_sizes(), &[3]);
        assert_eq!(dim.ranges().collect::<Vec<_>>(), vec![0..3]);
    }

    #[test]
    fn test_tiled_empty_extent() {
        let dim = BlockDim::tiled(0, 4);
        assert_eq!(dim.nblocks(), 0);
        assert_eq!(dim.ranges().count(), 0);
    }

    #[test]
    fn test_ranges_cover_extent_once() {
        for extent in 1..20 {
            for block in 1..8 {
                let dim = BlockDim::tiled(extent, block);
                let covered: Vec<usize> = dim.ranges().flatten().collect();
                assert_eq!(covered, (0..extent).collect::<Vec<_>>());
                let sizes: Vec<usize> = dim.ranges().map(|r| r.len()).collect();
                assert_eq!(sizes, dim.block_sizes());
            }
        }
    }
}
