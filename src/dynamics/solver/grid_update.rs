use super::ExplicitSolver;
use crate::distributed::Partition;
use crate::dynamics::solver::SolverParameters;
use crate::geometry::DiscontinuityRegistry;
use crate::math::Real;
use crate::utils;

impl ExplicitSolver {
    /// Integrates nodal momentum over `dt`, for active nodes only.
    ///
    /// On discontinuity/interface-enriched nodes the per-material fields are
    /// integrated independently and then corrected by the contact resolver,
    /// so opposite sides of a crack stop exchanging momentum once they
    /// separate.
    pub(crate) fn integrate_momentum(
        partition: &mut Partition,
        params: &SolverParameters,
        registry: &DiscontinuityRegistry,
        dt: Real,
    ) {
        for node in &mut partition.nodes {
            if !node.active() {
                continue;
            }

            let inv_mass = utils::inv_exact(node.dofs.mass);
            let acceleration = node.dofs.force_total() * inv_mass;
            let velocity = node.dofs.momentum() * inv_mass + acceleration * dt;

            *node.dofs.acceleration_mut() = acceleration;
            *node.dofs.velocity_mut() = velocity;
            *node.dofs.momentum_mut() = velocity * node.dofs.mass;

            if node.multimaterial() {
                Self::resolve_contact(node, params, registry, dt);
            }
        }
    }
}
