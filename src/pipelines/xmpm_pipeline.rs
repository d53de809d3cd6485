use crate::distributed::DomainDecomposition;
use crate::dynamics::solver::{ExplicitSolver, StepHooks};
use crate::dynamics::MaterialSet;
use anyhow::bail;

/// High-level driver of the explicit XMPM solver.
///
/// The pipeline owns the one-time setup that must happen before the first
/// step: configuration sanity checks, the initial level-set imprint on all
/// particles, and the initial (uniform) domain decomposition. Afterwards it
/// simply forwards to [`ExplicitSolver::run`].
pub struct XmpmPipeline {
    first_step: bool,
}

impl Default for XmpmPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl XmpmPipeline {
    pub fn new() -> Self {
        Self { first_step: true }
    }

    /// Advances the simulation by `total_steps` steps.
    pub fn run(
        &mut self,
        total_steps: u64,
        solver: &mut ExplicitSolver,
        decomp: &mut DomainDecomposition,
        materials: &MaterialSet,
        hooks: &mut dyn StepHooks,
    ) -> anyhow::Result<()> {
        if self.first_step {
            self.initialize(solver, decomp, materials)?;
            self.first_step = false;
        }

        solver.run(total_steps, decomp, materials, hooks)
    }

    fn initialize(
        &self,
        solver: &mut ExplicitSolver,
        decomp: &mut DomainDecomposition,
        materials: &MaterialSet,
    ) -> anyhow::Result<()> {
        if materials.is_empty() {
            bail!("no particle materials registered");
        }
        if decomp.nparticles() == 0 && solver.injections.is_empty() {
            bail!("no particles inserted and no injection scheduled");
        }
        if solver.params.discontinuity_mode && solver.registry.is_empty() {
            warn!("Discontinuity mode is enabled but no discontinuity is registered.");
        }

        solver.initialize_levelsets(decomp)?;
        decomp.decompose(true);

        info!(
            "Pipeline initialized: {} partition(s), {} particle(s), {} discontinuity(ies).",
            decomp.num_partitions(),
            decomp.nparticles(),
            solver.registry.len()
        );
        Ok(())
    }
}
