use super::{ChannelCore, MesonFieldMetadata, RunContext, StagMesonFieldParams};
use crate::compute::{ComputationReport, PerfCounters};
use crate::error::Result;
use crate::io::OutputSink;
use crate::kernel::StaggeredKernel;
use crate::lattice::{Lattice, StaggeredField};
use crate::scalar::c64;

/// Local staggered meson fields. Operators: `Identity` and `Gamma5`.
#[derive(Debug, Clone)]
pub struct StagMesonFieldChannel {
    core: ChannelCore,
}

impl StagMesonFieldChannel {
    pub fn setup(name: &str, params: &StagMesonFieldParams, lattice: &Lattice) -> Result<Self> {
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
        Ok(Self { core })
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn inputs(&self) -> Vec<String> {
        vec![self.core.left().to_string(), self.core.right().to_string()]
    }

    /// # Errors
    ///
    /// [`A2AError::UnsupportedOperator`](crate::A2AError::UnsupportedOperator)
    /// before any contraction if an operator has no local staggered form.
    pub fn execute<S>(
        &self,
        ctx: &mut RunContext,
        left: &[StaggeredField],
        right: &[StaggeredField],
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
        let kernel = StaggeredKernel::local(core.lattice(), core.gammas(), phases)?;
        core.run(trajectory, left, right, &kernel, sink, counters)
    }
}
