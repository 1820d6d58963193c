//! Blocked evaluation of the meson-field tensor.
//!
//! The `(left, right)` plane is tiled into outer blocks, each outer block into
//! cache blocks. Every cache block is one kernel call into a small workspace
//! that is copied into the outer-block workspace; once an outer block is
//! complete its values are final and are streamed to the sink for every
//! `(momentum, operator)` slice.
//!
//! ```text
//! for (iblock, jblock) in outer blocks, row-major:
//!     for (ic, jc) in cache blocks of (iblock, jblock):
//!         kernel.apply(cache, left[ic], right[jc])      "contraction"
//!         cache -> block at (ic, jc)                     "cache copy"
//!     for (m, g): sink.write_block(slice(m, g), block)   "I/O"
//! ```

pub mod timer;

use std::ops::Range;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{A2AError, Result};
use crate::index::IndexSpace;
use crate::io::{OutputSink, SliceBlock, SliceNaming, SliceShape, SliceTarget};
use crate::kernel::A2AKernel;
use crate::matrix_set::MatrixSet;
use crate::scalar::Scalar;

pub use timer::{PerfCounters, PhaseStats};

/// Cumulative totals after an outer block has been written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockProgress {
    /// Outer blocks completed so far.
    pub blocks: usize,
    /// Total estimated flops so far.
    pub flops: f64,
    /// Total estimated bytes so far.
    pub bytes: f64,
    /// Contraction time so far.
    pub elapsed: Duration,
}

impl BlockProgress {
    pub fn gflops(&self) -> f64 {
        self.rate(self.flops)
    }

    pub fn gbytes_per_sec(&self) -> f64 {
        self.rate(self.bytes)
    }

    fn rate(&self, amount: f64) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { amount / secs / 1e9 } else { 0.0 }
    }
}

/// What one `execute` call did.
#[derive(Debug, Clone, Default)]
pub struct ComputationReport {
    pub counters: PerfCounters,
    /// One entry per outer block, in processing order.
    pub progress: Vec<BlockProgress>,
    pub kernel_calls: usize,
    pub slices_written: usize,
}

/// Blocked driver for one index space.
///
/// Owns the outer-block and cache-block workspaces, which are reused across
/// blocks and across `execute` calls.
#[derive(Debug, Clone)]
pub struct BlockComputation<T: Scalar> {
    space: IndexSpace,
    block: MatrixSet<T>,
    cache: MatrixSet<T>,
}

impl<T: Scalar> BlockComputation<T> {
    pub fn new(space: IndexSpace) -> Self {
        let (nmom, nop, nt) = (space.n_momenta(), space.n_operators(), space.time_extent());
        Self {
            space,
            block: MatrixSet::new(nmom, nop, nt, 0, 0),
            cache: MatrixSet::new(nmom, nop, nt, 0, 0),
        }
    }

    pub fn index_space(&self) -> &IndexSpace {
        &self.space
    }

    /// Contract `left` against `right` with `kernel` and stream every slice to `sink`.
    ///
    /// `naming` is consulted exactly once per slice, before any contraction.
    ///
    /// # Errors
    ///
    /// - [`A2AError::SizeMismatch`] if `left` or `right` does not match the
    ///   index space; no kernel call is made.
    /// - [`A2AError::KernelMismatch`] if the kernel was built for another
    ///   momentum or operator count; no kernel call is made.
    /// - Any kernel or sink error, which aborts the call. Slices already
    ///   begun are left as the sink holds them.
    pub fn execute<F, K, N, M, S>(
        &mut self,
        left: &[F],
        right: &[F],
        kernel: &K,
        naming: &N,
        sink: &mut S,
    ) -> Result<ComputationReport>
    where
        K: A2AKernel<T, F> + ?Sized,
        N: SliceNaming<M> + ?Sized,
        S: OutputSink<T, M> + ?Sized,
    {
        let space = self.space;
        let checks = [
            ("left vectors", space.n_left(), left.len()),
            ("right vectors", space.n_right(), right.len()),
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
        let kernel_checks = [
            ("momenta", space.n_momenta(), kernel.n_momenta()),
            ("operators", space.n_operators(), kernel.n_operators()),
        ];
        for (what, expected, actual) in kernel_checks {
            if expected != actual {
                return Err(A2AError::KernelMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }

        let mut report = ComputationReport::default();
        let shape = SliceShape {
            time_extent: space.time_extent(),
            n_left: space.n_left(),
            n_right: space.n_right(),
        };
        let targets = slice_targets(&space, naming);
        report.counters.time(timer::IO, || -> Result<()> {
            for target in &targets {
                sink.begin_slice(target, shape)?;
            }
            Ok(())
        })?;

        let left_blocks = space.left_blocks();
        let right_blocks = space.right_blocks();
        let n_blocks = left_blocks.nblocks() * right_blocks.nblocks();
        info!(
            n_left = space.n_left(),
            n_right = space.n_right(),
            block = space.block_size(),
            cache_block = space.cache_block_size(),
            n_blocks,
            n_slices = targets.len(),
            "starting blocked contraction"
        );

        for irange in left_blocks.ranges() {
            for jrange in right_blocks.ranges() {
                debug!(
                    block = report.progress.len() + 1,
                    of = n_blocks,
                    rows = ?irange,
                    cols = ?jrange,
                    "outer block"
                );
                self.contract_block(&irange, &jrange, left, right, kernel, &mut report)?;

                let block = &self.block;
                report.counters.time(timer::IO, || -> Result<()> {
                    for target in &targets {
                        let data = block.slice(target.momentum, target.operator);
                        let view = SliceBlock::new(
                            irange.start,
                            jrange.start,
                            block.rows(),
                            block.cols(),
                            block.time_extent(),
                            data,
                        );
                        sink.write_block(target, &view)?;
                    }
                    Ok(())
                })?;

                let progress = cumulative(&report.counters, report.progress.len() + 1);
                debug!(
                    block = progress.blocks,
                    gflops = progress.gflops(),
                    gbytes_per_sec = progress.gbytes_per_sec(),
                    "block done"
                );
                report.progress.push(progress);
            }
        }

        report.counters.time(timer::IO, || -> Result<()> {
            for target in &targets {
                sink.finish_slice(target)?;
            }
            Ok(())
        })?;
        report.slices_written = targets.len();
        report.counters.log_summary();
        Ok(report)
    }

    fn contract_block<F, K>(
        &mut self,
        irange: &Range<usize>,
        jrange: &Range<usize>,
        left: &[F],
        right: &[F],
        kernel: &K,
        report: &mut ComputationReport,
    ) -> Result<()>
    where
        K: A2AKernel<T, F> + ?Sized,
    {
        let space = self.space;
        self.block.reshape(irange.len(), jrange.len());
        let icache = space.cache_blocks(irange.len());
        let jcache = space.cache_blocks(jrange.len());

        for ic in icache.ranges() {
            for jc in jcache.ranges() {
                let (bi, bj) = (ic.len(), jc.len());
                self.cache.reshape(bi, bj);
                let lhs = &left[irange.start + ic.start..irange.start + ic.end];
                let rhs = &right[jrange.start + jc.start..jrange.start + jc.end];

                let cache = &mut self.cache;
                report
                    .counters
                    .time(timer::CONTRACTION, || kernel.apply(cache, lhs, rhs))?;
                report
                    .counters
                    .add_work(timer::CONTRACTION, kernel.flops(bi, bj), kernel.bytes(bi, bj));
                report.kernel_calls += 1;

                let (cache, block) = (&self.cache, &mut self.block);
                report
                    .counters
                    .time(timer::CACHE_COPY, || cache.copy_into(block, ic.start, jc.start));
            }
        }
        Ok(())
    }
}

fn slice_targets<M, N>(space: &IndexSpace, naming: &N) -> Vec<SliceTarget<M>>
where
    N: SliceNaming<M> + ?Sized,
{
    let mut targets = Vec::with_capacity(space.n_slices());
    for momentum in 0..space.n_momenta() {
        for operator in 0..space.n_operators() {
            targets.push(SliceTarget {
                momentum,
                operator,
                name: naming.name(momentum, operator),
                path: naming.path(momentum, operator),
                metadata: naming.metadata(momentum, operator),
            });
        }
    }
    targets
}

fn cumulative(counters: &PerfCounters, blocks: usize) -> BlockProgress {
    let stats = counters
        .phase(timer::CONTRACTION)
        .copied()
        .unwrap_or_default();
    BlockProgress {
        blocks,
        flops: stats.flops,
        bytes: stats.bytes,
        elapsed: stats.elapsed,
    }
}
