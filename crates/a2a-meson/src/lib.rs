//! a2a-meson - blocked all-to-all meson-field contractions
//!
//! This crate computes the rank-5 meson-field tensor
//! `M[t, m, g, i, j]` between two sets of lattice vectors, tiling the
//! `(i, j)` plane so that only one block lives in memory at a time.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Channels (channel module)
//!     → parameters, momentum phases, slice naming
//!
//! Level 2: Block engine (compute module)
//!     → outer blocks, cache blocks, performance counters
//!
//! Level 3: Kernels (kernel module)
//!     → MesonKernel, StaggeredKernel (faer GEMM per time slice)
//!
//! Sinks (io module)
//!     → FileSink, MemorySink
//! ```
//!
//! # Example
//!
//! ```
//! use a2a_meson::{
//!     FermionField, Lattice, MemorySink, MesonFieldChannel, MesonFieldParams, RunContext,
//! };
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let lattice = Lattice::new(&[2, 2, 2, 4]).unwrap();
//! let params = MesonFieldParams::from_json_str(
//!     r#"{"cacheBlock": 2, "block": 4, "left": "w", "right": "v",
//!         "output": "mf", "gammas": "Gamma5", "mom": ["0 0 0"]}"#,
//! )
//! .unwrap();
//! let channel = MesonFieldChannel::setup("mf", &params, &lattice).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let w: Vec<FermionField> = (0..3)
//!     .map(|_| FermionField::random_with_rng(&lattice, 12, &mut rng))
//!     .collect();
//!
//! let mut ctx = RunContext::new(100);
//! let mut sink = MemorySink::new();
//! channel.execute(&mut ctx, &w, &w, &mut sink).unwrap();
//!
//! let slice = sink.slice("Gamma5_0_0_0").unwrap();
//! assert_eq!(slice.data.len(), 4 * 3 * 3);
//! ```

pub mod channel;
pub mod compute;
pub mod error;
pub mod gamma;
pub mod index;
pub mod io;
pub mod kernel;
pub mod lattice;
pub mod matrix_set;
pub mod scalar;
pub mod storage;
pub mod strides;

pub use channel::{
    MesonFieldChannel, MesonFieldMetadata, MesonFieldParams, RunContext, StagMesonFieldCcChannel,
    StagMesonFieldCcParams, StagMesonFieldChannel, StagMesonFieldParams,
};
pub use compute::{BlockComputation, BlockProgress, ComputationReport, PerfCounters, PhaseStats};
pub use error::{A2AError, Result};
pub use gamma::Gamma;
pub use index::{BlockDim, IndexSpace};
pub use io::{FileSink, MemorySink, NamingFns, OutputSink, Slice, SliceNaming, read_slice};
pub use kernel::{A2AKernel, MesonKernel, StaggeredKernel};
pub use lattice::{FermionField, GaugeField, Lattice, LatticeField, StaggeredField};
pub use matrix_set::MatrixSet;
pub use scalar::{Scalar, c64};
