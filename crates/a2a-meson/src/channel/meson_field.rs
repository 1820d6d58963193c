use super::{ChannelCore, MesonFieldMetadata, MesonFieldParams, RunContext};
use crate::compute::{ComputationReport, PerfCounters};
use crate::error::Result;
use crate::io::OutputSink;
use crate::kernel::MesonKernel;
use crate::lattice::{FermionField, Lattice};
use crate::scalar::c64;

/// Wilson-type meson fields `conj(w_i) Γ e^{ipx} v_j` for every gamma and momentum.
#[derive(Debug, Clone)]
pub struct MesonFieldChannel {
    core: ChannelCore,
}

impl MesonFieldChannel {
    /// Parse operators and momenta for `lattice`.
    ///
    /// # Errors
    ///
    /// [`A2AError::Config`](crate::A2AError::Config) for unknown gammas,
    /// momenta with the wrong number of components, or zero block sizes.
    pub fn setup(name: &str, params: &MesonFieldParams, lattice: &Lattice) -> Result<Self> {
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

    /// Identifiers this channel reads.
    pub fn inputs(&self) -> Vec<String> {
        vec![self.core.left().to_string(), self.core.right().to_string()]
    }

    pub fn execute<S>(
        &self,
        ctx: &mut RunContext,
        left: &[FermionField],
        right: &[FermionField],
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
        let kernel = MesonKernel::new(core.lattice(), core.gammas(), phases)?;
        core.run(trajectory, left, right, &kernel, sink, counters)
    }
}
