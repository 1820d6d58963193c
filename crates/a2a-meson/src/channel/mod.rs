//! Physics channels: configured meson-field computations.
//!
//! A channel owns its parsed parameters, fetches momentum phases from the
//! run's [`MomentumPhaseCache`], builds its kernel and hands everything to a
//! [`BlockComputation`]. Output slices are named
//! `<gamma>_<p0>_<p1>_<p2>` and written under `<output>.<trajectory>/`.

mod meson_field;
mod stag_meson_field;
mod stag_meson_field_cc;

pub use meson_field::MesonFieldChannel;
pub use stag_meson_field::StagMesonFieldChannel;
pub use stag_meson_field_cc::StagMesonFieldCcChannel;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compute::timer::{self, PerfCounters};
use crate::compute::{BlockComputation, ComputationReport};
use crate::error::Result;
use crate::gamma::{Gamma, parse_gamma_list};
use crate::index::IndexSpace;
use crate::io::{OutputSink, SLICE_FILE_EXTENSION, SliceNaming};
use crate::kernel::A2AKernel;
use crate::lattice::{ComplexField, Lattice, MomentumPhaseCache, parse_momentum};
use crate::scalar::c64;

/// State shared by every channel of one run.
#[derive(Debug, Default)]
pub struct RunContext {
    /// Trajectory number, part of every output directory.
    pub trajectory: u32,
    pub phases: MomentumPhaseCache,
}

impl RunContext {
    pub fn new(trajectory: u32) -> Self {
        Self {
            trajectory,
            phases: MomentumPhaseCache::new(),
        }
    }
}

/// Metadata record attached to every meson-field slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MesonFieldMetadata {
    pub momentum: Vec<f64>,
    pub gamma: Gamma,
}

/// Parameters of [`MesonFieldChannel`] and [`StagMesonFieldChannel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MesonFieldParams {
    pub cache_block: usize,
    pub block: usize,
    /// Identifier of the left vector set.
    pub left: String,
    /// Identifier of the right vector set.
    pub right: String,
    /// Output prefix; slices go to `<output>.<trajectory>/`.
    pub output: String,
    /// `"all"` or whitespace-separated gamma names.
    pub gammas: String,
    /// One whitespace-separated momentum per entry.
    pub mom: Vec<String>,
}

/// Parameters of [`StagMesonFieldChannel`].
pub type StagMesonFieldParams = MesonFieldParams;

/// Parameters of [`StagMesonFieldCcChannel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagMesonFieldCcParams {
    pub cache_block: usize,
    pub block: usize,
    /// Identifier of the gauge field.
    pub gauge: String,
    pub left: String,
    pub right: String,
    pub output: String,
    pub gammas: String,
    pub mom: Vec<String>,
}

impl MesonFieldParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl StagMesonFieldCcParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parsed configuration common to all channels.
#[derive(Debug, Clone)]
pub(crate) struct ChannelCore {
    name: String,
    lattice: Lattice,
    gammas: Vec<Gamma>,
    momenta: Vec<Vec<f64>>,
    space: IndexSpace,
    left: String,
    right: String,
    output: String,
}

impl ChannelCore {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn setup(
        name: &str,
        lattice: &Lattice,
        gammas: &str,
        mom: &[String],
        block: usize,
        cache_block: usize,
        left: &str,
        right: &str,
        output: &str,
    ) -> Result<Self> {
        let gammas = parse_gamma_list(gammas)?;
        let momenta = mom
            .iter()
            .map(|p| parse_momentum(p, lattice.nd()))
            .collect::<Result<Vec<_>>>()?;
        // Vector counts are only known at execution.
        let space = IndexSpace::new(
            lattice.time_extent(),
            momenta.len(),
            gammas.len(),
            0,
            0,
            block,
            cache_block,
        )?;
        Ok(Self {
            name: name.to_string(),
            lattice: lattice.clone(),
            gammas,
            momenta,
            space,
            left: left.to_string(),
            right: right.to_string(),
            output: output.to_string(),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub(crate) fn gammas(&self) -> &[Gamma] {
        &self.gammas
    }

    pub(crate) fn momenta(&self) -> &[Vec<f64>] {
        &self.momenta
    }

    pub(crate) fn left(&self) -> &str {
        &self.left
    }

    pub(crate) fn right(&self) -> &str {
        &self.right
    }

    fn phase_key(&self) -> String {
        format!("{}_momph", self.name)
    }

    /// Phase fields for this channel's momenta, generated on first use.
    pub(crate) fn phases<'c>(
        &self,
        ctx: &'c mut RunContext,
        counters: &mut PerfCounters,
    ) -> Result<&'c [ComplexField]> {
        let key = self.phase_key();
        if !ctx.phases.is_computed(&key) {
            counters.time(timer::MOMENTUM_PHASES, || {
                ctx.phases
                    .get_or_compute(&key, &self.lattice, &self.momenta)
                    .map(|_| ())
            })?;
        }
        ctx.phases.get_or_compute(&key, &self.lattice, &self.momenta)
    }

    pub(crate) fn log_run(&self, n_left: usize, n_right: usize) {
        let nt = self.lattice.time_extent();
        info!(channel = %self.name, "computing all-to-all meson fields");
        info!(left = %self.left, right = %self.right, "vectors");
        for p in &self.momenta {
            info!(momentum = ?p, "momentum");
        }
        for g in &self.gammas {
            info!(gamma = %g, "spin bilinear");
        }
        info!(
            nt,
            n_left,
            n_right,
            file_bytes = nt * n_left * n_right * std::mem::size_of::<c64>(),
            "meson field size per momentum and bilinear"
        );
    }

    /// Run the engine and fold the channel's own timings into the report.
    pub(crate) fn run<F, K, S>(
        &self,
        trajectory: u32,
        left: &[F],
        right: &[F],
        kernel: &K,
        sink: &mut S,
        counters: PerfCounters,
    ) -> Result<ComputationReport>
    where
        K: A2AKernel<c64, F> + ?Sized,
        S: OutputSink<c64, MesonFieldMetadata> + ?Sized,
    {
        let space = self.space.with_vectors(left.len(), right.len());
        let mut engine = BlockComputation::<c64>::new(space);
        let naming = MesonFieldNaming {
            core: self,
            trajectory,
        };
        let mut report = engine.execute(left, right, kernel, &naming, sink)?;
        report.counters.merge(&counters);
        Ok(report)
    }
}

/// `<gamma>_<p0>_<p1>_<p2>`.
pub(crate) fn slice_name(gamma: Gamma, momentum: &[f64]) -> String {
    let mut name = gamma.to_string();
    for p in momentum {
        name.push('_');
        name.push_str(&p.to_string());
    }
    name
}

struct MesonFieldNaming<'a> {
    core: &'a ChannelCore,
    trajectory: u32,
}

impl SliceNaming<MesonFieldMetadata> for MesonFieldNaming<'_> {
    fn name(&self, momentum: usize, operator: usize) -> String {
        slice_name(self.core.gammas[operator], &self.core.momenta[momentum])
    }

    fn path(&self, momentum: usize, operator: usize) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.core.output, self.trajectory)).join(format!(
            "{}.{}",
            self.name(momentum, operator),
            SLICE_FILE_EXTENSION
        ))
    }

    fn metadata(&self, momentum: usize, operator: usize) -> MesonFieldMetadata {
        MesonFieldMetadata {
            momentum: self.core.momenta[momentum].clone(),
            gamma: self.core.gammas[operator],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::A2AError;

    fn lattice() -> Lattice {
        Lattice::new(&[2, 2, 2, 4]).unwrap()
    }

    fn core(gammas: &str, mom: &[&str]) -> Result<ChannelCore> {
        let mom: Vec<String> = mom.iter().map(|s| s.to_string()).collect();
        ChannelCore::setup("mf", &lattice(), gammas, &mom, 4, 2, "w", "v", "out/mf")
    }

    #[test]
    fn test_params_from_json() {
        let params = MesonFieldParams::from_json_str(
            r#"{"cacheBlock": 2, "block": 8, "left": "w", "right": "v",
                "output": "out/mf", "gammas": "all", "mom": ["0 0 0", "1 0 0"]}"#,
        )
        .unwrap();
        assert_eq!(params.cache_block, 2);
        assert_eq!(params.mom.len(), 2);
        assert!(MesonFieldParams::from_json_str(r#"{"block": 8}"#).is_err());
    }

    #[test]
    fn test_setup_errors() {
        assert!(matches!(
            core("Gamma5", &["1 0"]),
            Err(A2AError::Config { .. })
        ));
        assert!(matches!(
            core("Gamma9", &["0 0 0"]),
            Err(A2AError::Config { .. })
        ));
        // No momenta means no slices.
        assert!(core("Gamma5", &[]).is_err());
    }

    #[test]
    fn test_naming() {
        let core = core("Gamma5 GammaX", &["0 0 0", "1 -1 0.5"]).unwrap();
        let naming = MesonFieldNaming {
            core: &core,
            trajectory: 1200,
        };
        assert_eq!(naming.name(1, 1), "GammaX_1_-1_0.5");
        assert_eq!(
            naming.path(0, 0),
            PathBuf::from("out/mf.1200/Gamma5_0_0_0.a2am")
        );
        assert_eq!(
            naming.metadata(1, 0),
            MesonFieldMetadata {
                momentum: vec![1.0, -1.0, 0.5],
                gamma: Gamma::Gamma5,
            }
        );
    }
}
