use super::{ConcentratedForce, ExplicitSolver};
use crate::distributed::Partition;
use crate::dynamics::solver::SolverParameters;
use crate::dynamics::MeshNode;
use crate::math::{Real, Vector};
use std::sync::atomic::Ordering;

impl ExplicitSolver {
    /// Maps both force families to the nodes of one partition.
    ///
    /// External (gravity body force, traction, concentrated nodal forces)
    /// and internal (stress divergence) contributions write disjoint nodal
    /// accumulators, so the two tasks run in parallel and are joined before
    /// any reader sees the union. Enrichment entries must already exist (see
    /// the tagging phase): neither task is allowed to allocate node storage.
    pub(crate) fn map_forces(
        partition: &mut Partition,
        params: &SolverParameters,
        concentrated: &[(usize, Vector<Real>)],
    ) {
        let Partition {
            nodes, particles, ..
        } = partition;

        let nodes_ptr = &std::sync::atomic::AtomicPtr::new(nodes as *mut Vec<MeshNode>);

        rayon::join(
            || {
                let nodes: &mut Vec<MeshNode> =
                    unsafe { &mut *nodes_ptr.load(Ordering::Relaxed) };

                for particle in particles.iter() {
                    if particle.cell.is_none() {
                        continue;
                    }
                    let materials = Self::enrichment_materials(particle, params);

                    for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                        let w = particle.shape.weights[k];
                        let mut force = params.gravity * (w * particle.mass);
                        if let Some(traction) = &particle.traction {
                            force += traction * w;
                        }

                        let node = &mut nodes[*node_id];
                        *node.dofs.force_external_mut() += force;
                        for material in &materials {
                            if let Some(entry) = node.material_entry(*material) {
                                *entry.dofs.force_external_mut() += force;
                            }
                        }
                    }
                }

                for (node_id, force) in concentrated {
                    *nodes[*node_id].dofs.force_external_mut() += force;
                }
            },
            || {
                let nodes: &mut Vec<MeshNode> =
                    unsafe { &mut *nodes_ptr.load(Ordering::Relaxed) };

                for particle in particles.iter() {
                    if particle.cell.is_none() {
                        continue;
                    }
                    let materials = Self::enrichment_materials(particle, params);

                    for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                        let gradient = particle.shape.gradients[k];
                        let force = -(particle.stress * gradient) * particle.volume;

                        let node = &mut nodes[*node_id];
                        *node.dofs.force_internal_mut() += force;
                        for material in &materials {
                            if let Some(entry) = node.material_entry(*material) {
                                *entry.dofs.force_internal_mut() += force;
                            }
                        }
                    }
                }
            },
        );
    }

    /// Concentrated nodal forces active at `time`, restricted to the nodes
    /// this rank owns so each force is applied exactly once globally.
    /// `owners` holds the owning rank of each force's node, aligned with
    /// `forces`.
    pub(crate) fn active_concentrated_forces(
        forces: &[ConcentratedForce],
        owners: &[usize],
        rank: usize,
        time: Real,
    ) -> Vec<(usize, Vector<Real>)> {
        forces
            .iter()
            .zip(owners.iter())
            .filter(|(f, owner)| time >= f.start_time && time < f.end_time && **owner == rank)
            .map(|(f, _)| (f.node, f.force))
            .collect()
    }
}
