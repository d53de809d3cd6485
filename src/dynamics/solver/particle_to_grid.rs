use super::ExplicitSolver;
use crate::distributed::Partition;
use crate::dynamics::solver::SolverParameters;
use crate::dynamics::{EnrichmentId, Particle, ParticleSet};
use crate::geometry::BackgroundGrid;
use crate::math::Kernel;

impl ExplicitSolver {
    pub(crate) fn evaluate_shape_functions(grid: &BackgroundGrid, particles: &mut ParticleSet) {
        for particle in particles.iter_mut() {
            let cell = match particle.cell {
                Some(cell) => cell,
                None => continue,
            };

            let xi = grid.local_coords(cell, &particle.position);
            particle.shape.nodes = grid.cell_nodes(cell);
            particle.shape.weights = Kernel::weights(&xi);
            particle.shape.gradients = Kernel::gradients(&xi, grid.cell_width());
        }
    }

    /// The enrichment fields a particle contributes to. Side fields come
    /// first so they take precedence when interpolating back.
    pub(crate) fn enrichment_materials(
        particle: &Particle,
        params: &SolverParameters,
    ) -> Vec<EnrichmentId> {
        let mut out = vec![];
        if params.discontinuity_mode {
            out.extend((0..particle.levelsets.len()).map(|c| particle.side_material(c)));
        }
        if params.interface_mode {
            out.push(EnrichmentId::Interface(particle.material));
        }
        out
    }

    /// Pre-creates the enrichment entries on every node under each
    /// particle's support. The concurrent force mapping relies on these
    /// entries already existing.
    pub(crate) fn tag_material_presence(partition: &mut Partition, params: &SolverParameters) {
        let Partition {
            nodes, particles, ..
        } = partition;

        for particle in particles.iter() {
            if particle.cell.is_none() {
                continue;
            }
            for material in Self::enrichment_materials(particle, params) {
                for node_id in &particle.shape.nodes {
                    nodes[*node_id].tag_material(material);
                }
            }
        }
    }

    pub(crate) fn map_mass_momentum(partition: &mut Partition) {
        let Partition {
            nodes, particles, ..
        } = partition;

        for particle in particles.iter() {
            if particle.cell.is_none() {
                continue;
            }

            for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                let w = particle.shape.weights[k];
                let node = &mut nodes[*node_id];

                node.dofs.mass += w * particle.mass;
                *node.dofs.momentum_mut() += particle.velocity * (w * particle.mass);
                node.set_active(true);
            }
        }
    }

    pub(crate) fn compute_nodal_velocities(partition: &mut Partition) {
        for node in &mut partition.nodes {
            if !node.active() {
                continue;
            }
            let velocity = node.dofs.momentum() * crate::utils::inv_exact(node.dofs.mass);
            *node.dofs.velocity_mut() = velocity;
        }
    }

    /// Accumulates mass, momentum, displacement and domain gradient into the
    /// enrichment entries.
    pub(crate) fn map_multimaterial(partition: &mut Partition, params: &SolverParameters) {
        let Partition {
            nodes, particles, ..
        } = partition;

        for particle in particles.iter() {
            if particle.cell.is_none() {
                continue;
            }

            for material in Self::enrichment_materials(particle, params) {
                for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                    let w = particle.shape.weights[k];
                    let gradient = particle.shape.gradients[k];
                    let node = &mut nodes[*node_id];

                    // Entries were created by the tagging phase.
                    if let Some(entry) = node.material_entry(material) {
                        entry.dofs.mass += w * particle.mass;
                        *entry.dofs.momentum_mut() += particle.velocity * (w * particle.mass);
                        entry.displacement += particle.displacement * (w * particle.mass);
                        entry.domain_gradient += gradient * particle.volume;
                    }
                }
            }
        }

        for node in nodes.iter_mut() {
            for entry in &mut node.materials {
                let velocity = entry.dofs.momentum() * crate::utils::inv_exact(entry.dofs.mass);
                *entry.dofs.velocity_mut() = velocity;
            }
        }
    }
}
