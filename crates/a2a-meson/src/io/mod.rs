//! Output of completed meson-field slices.
//!
//! A slice is the `time x left x right` tensor for one `(momentum, operator)`
//! pair. The engine names every slice once up front, then streams each
//! outer block's final values into it, then closes it:
//!
//! ```text
//! begin_slice(target, shape)      once per slice, before any block
//! write_block(target, block)      once per slice and outer block
//! finish_slice(target)            once per slice, after the last block
//! ```
//!
//! Every `(t, i, j)` element reaches a sink exactly once and is already final.

mod file;
mod memory;

pub use file::{FileSink, SLICE_FILE_EXTENSION, read_slice};
pub use memory::{MemorySink, SinkEvent};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scalar::Scalar;

/// Extents of one complete slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceShape {
    pub time_extent: usize,
    pub n_left: usize,
    pub n_right: usize,
}

impl SliceShape {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.time_extent * self.n_left * self.n_right
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major offset of `(t, i, j)`.
    #[inline]
    pub fn offset(&self, t: usize, i: usize, j: usize) -> usize {
        (t * self.n_left + i) * self.n_right + j
    }
}

/// Identity and destination of one output slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceTarget<M> {
    pub momentum: usize,
    pub operator: usize,
    pub name: String,
    pub path: PathBuf,
    pub metadata: M,
}

/// The part of a slice covered by one outer block.
///
/// `data` has layout `[rows, cols, time]` column-major, as held by the
/// engine's workspace.
#[derive(Debug, Clone, Copy)]
pub struct SliceBlock<'a, T> {
    pub row_offset: usize,
    pub col_offset: usize,
    pub rows: usize,
    pub cols: usize,
    pub time_extent: usize,
    data: &'a [T],
}

impl<'a, T: Scalar> SliceBlock<'a, T> {
    /// Wrap block data.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols * time_extent`.
    pub fn new(
        row_offset: usize,
        col_offset: usize,
        rows: usize,
        cols: usize,
        time_extent: usize,
        data: &'a [T],
    ) -> Self {
        assert_eq!(data.len(), rows * cols * time_extent, "block data length");
        Self {
            row_offset,
            col_offset,
            rows,
            cols,
            time_extent,
            data,
        }
    }

    /// Element at time `t`, local row `i`, local column `j`.
    #[inline]
    pub fn get(&self, t: usize, i: usize, j: usize) -> T {
        self.data[i + self.rows * (j + self.cols * t)]
    }

    /// Raw block data.
    pub fn data(&self) -> &'a [T] {
        self.data
    }
}

/// A complete slice held in memory, row-major `[t][i][j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<T, M> {
    pub name: String,
    pub shape: SliceShape,
    pub metadata: M,
    pub data: Vec<T>,
}

impl<T: Scalar, M> Slice<T, M> {
    /// Element `(t, i, j)`.
    #[inline]
    pub fn get(&self, t: usize, i: usize, j: usize) -> T {
        self.data[self.shape.offset(t, i, j)]
    }

    /// The `left x right` matrix at time `t`, row-major.
    pub fn matrix(&self, t: usize) -> &[T] {
        let len = self.shape.n_left * self.shape.n_right;
        &self.data[t * len..(t + 1) * len]
    }
}

/// Persistence capability for meson-field slices.
pub trait OutputSink<T: Scalar, M> {
    /// Prepare a slice of the given shape.
    fn begin_slice(&mut self, target: &SliceTarget<M>, shape: SliceShape) -> Result<()>;

    /// Store the final values of one outer block.
    fn write_block(&mut self, target: &SliceTarget<M>, block: &SliceBlock<'_, T>) -> Result<()>;

    /// Every block of the slice has been written.
    fn finish_slice(&mut self, _target: &SliceTarget<M>) -> Result<()> {
        Ok(())
    }
}

/// Per-slice naming: logical name, destination and metadata record.
pub trait SliceNaming<M> {
    fn name(&self, momentum: usize, operator: usize) -> String;
    fn path(&self, momentum: usize, operator: usize) -> PathBuf;
    fn metadata(&self, momentum: usize, operator: usize) -> M;
}

/// [`SliceNaming`] from three closures.
pub struct NamingFns<N, P, D> {
    name_fn: N,
    path_fn: P,
    metadata_fn: D,
}

impl<N, P, D> NamingFns<N, P, D> {
    pub fn new<M>(name_fn: N, path_fn: P, metadata_fn: D) -> Self
    where
        N: Fn(usize, usize) -> String,
        P: Fn(usize, usize) -> PathBuf,
        D: Fn(usize, usize) -> M,
    {
        Self {
            name_fn,
            path_fn,
            metadata_fn,
        }
    }
}

impl<M, N, P, D> SliceNaming<M> for NamingFns<N, P, D>
where
    N: Fn(usize, usize) -> String,
    P: Fn(usize, usize) -> PathBuf,
    D: Fn(usize, usize) -> M,
{
    fn name(&self, momentum: usize, operator: usize) -> String {
        (self.name_fn)(momentum, operator)
    }

    fn path(&self, momentum: usize, operator: usize) -> PathBuf {
        (self.path_fn)(momentum, operator)
    }

    fn metadata(&self, momentum: usize, operator: usize) -> M {
        (self.metadata_fn)(momentum, operator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_block_get() {
        // rows = 2, cols = 1, time = 2
        let data = [1.0, 2.0, 3.0, 4.0];
        let block = SliceBlock::new(0, 0, 2, 1, 2, &data);
        assert_eq!(block.get(0, 1, 0), 2.0);
        assert_eq!(block.get(1, 0, 0), 3.0);
    }

    #[test]
    fn test_shape_offset() {
        let shape = SliceShape {
            time_extent: 2,
            n_left: 3,
            n_right: 4,
        };
        assert_eq!(shape.len(), 24);
        assert_eq!(shape.offset(1, 2, 3), 23);
    }

    #[test]
    fn test_naming_fns() {
        let naming: &dyn SliceNaming<usize> = &NamingFns::new(
            |m, g| format!("{m}_{g}"),
            |m, g| PathBuf::from(format!("out/{m}_{g}.a2am")),
            |m: usize, _| m * 10,
        );
        assert_eq!(naming.name(1, 2), "1_2");
        assert_eq!(naming.path(0, 3), PathBuf::from("out/0_3.a2am"));
        assert_eq!(naming.metadata(4, 0), 40);
    }
}
