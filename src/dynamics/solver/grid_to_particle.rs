use super::ExplicitSolver;
use crate::distributed::Partition;
use crate::dynamics::solver::{SolverParameters, VelocityUpdate};
use crate::dynamics::{EnrichmentId, MeshNode};
use crate::math::{Real, Vector};

impl ExplicitSolver {
    /// The nodal velocity/acceleration a particle should interpolate from:
    /// its own enrichment field where the node is contested by several
    /// materials, the base field otherwise.
    ///
    /// At a single-material node the enrichment accumulators duplicate the
    /// base ones but only the base field goes through momentum integration,
    /// so the base field is authoritative there.
    pub(crate) fn nodal_fields(
        node: &MeshNode,
        materials: &[EnrichmentId],
    ) -> (Vector<Real>, Vector<Real>) {
        if node.multimaterial() {
            for material in materials {
                if let Some(entry) = node.material_entry_ref(*material) {
                    return (*entry.dofs.velocity(), *entry.dofs.acceleration());
                }
            }
        }
        (*node.dofs.velocity(), *node.dofs.acceleration())
    }

    /// Updates particle velocities and positions from the integrated nodal
    /// solution.
    pub(crate) fn update_particles(partition: &mut Partition, params: &SolverParameters, dt: Real) {
        let Partition {
            nodes, particles, ..
        } = partition;

        for particle in particles.iter_mut() {
            if particle.cell.is_none() {
                continue;
            }
            let materials = Self::enrichment_materials(particle, params);

            let mut velocity_pic = Vector::zeros();
            let mut acceleration = Vector::zeros();

            for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                let w = particle.shape.weights[k];
                let (v, a) = Self::nodal_fields(&nodes[*node_id], &materials);
                velocity_pic += v * w;
                acceleration += a * w;
            }

            particle.velocity = match params.velocity_update {
                VelocityUpdate::Pic => velocity_pic,
                VelocityUpdate::Flip { blend } => {
                    (particle.velocity + acceleration * dt) * blend
                        + velocity_pic * (1.0 - blend)
                }
            };

            // Positions always follow the interpolated nodal velocity field.
            let dx = velocity_pic * dt;
            particle.position += dx;
            particle.displacement += dx;
        }
    }

    /// Applies the per-particle velocity boundary constraints.
    pub(crate) fn apply_velocity_constraints(partition: &mut Partition) {
        for particle in partition.particles.iter_mut() {
            if let Some((component, value)) = particle.velocity_constraint {
                particle.velocity[component] = value;
            }
        }
    }
}
