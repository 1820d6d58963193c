use super::{ChannelCore, MesonFieldMetadata, RunContext, StagMesonFieldCcParams};
use crate::compute::{ComputationReport, PerfCounters};
use crate::error::Result;
use crate::io::OutputSink;
use crate::kernel::StaggeredKernel;
use crate::lattice::{GaugeField, Lattice, StaggeredField};
use crate::scalar::c64;

/// Staggered conserved-current meson fields
/// `conj(w_i(x)) η_mu(x) U_mu(x) v_j(x + mu) e^{ipx}`.
///
/// Each of `GammaX`, `GammaY`, `GammaZ`, `GammaT` selects the link direction;
/// several directions can be computed in one execution.
#[derive(Debug, Clone)]
pub struct StagMesonFieldCcChannel {
    core: ChannelCore,
    gauge: String,
}

impl StagMesonFieldCcChannel {
    pub fn setup(name: &str, params: &StagMesonFieldCcParams, lattice: &Lattice) -> Result<Self> {
        let core = ChannelCore::setup(
            name,
            lattice,
            &params.gammas,
            &params.mom,
            params.block,
            params.cache_block,
            &params.left,
            &params.right,
            &params.output,
        )?;
        Ok(Self {
            core,
            gauge: params.gauge.clone(),
        })
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn inputs(&self) -> Vec<String> {
        vec![
            self.gauge.clone(),
            self.core.left().to_string(),
            self.core.right().to_string(),
        ]
    }

    pub fn execute<S>(
        &self,
        ctx: &mut RunContext,
        left: &[StaggeredField],
        right: &[StaggeredField],
        gauge: &GaugeField,
        sink: &mut S,
    ) -> Result<ComputationReport>
    where
        S: OutputSink<c64, MesonFieldMetadata> + ?Sized,
    {
        let core = &self.core;
        core.log_run(left.len(), right.len());
        let trajectory = ctx.trajectory;
        let mut counters = PerfCounters::new();
        let phases = core.phases(ctx, &mut counters)?;
        let kernel = StaggeredKernel::one_link(core.lattice(), gauge, core.gammas(), phases)?;
        core.run(trajectory, left, right, &kernel, sink, counters)
    }
}
