use super::ExplicitSolver;
use crate::distributed::Partition;
use crate::dynamics::solver::SolverParameters;
use crate::dynamics::{EnrichmentId, MeshNode};
use crate::geometry::DiscontinuityRegistry;
use crate::math::{Real, Vector};

impl ExplicitSolver {
    /// Derives the contact geometry of every multi-material node: a
    /// separation vector between each material and the rest, and the unit
    /// normal of the local contact surface.
    ///
    /// Nodes carrying a single material are skipped entirely; their contact
    /// quantities stay zero-initialized.
    pub(crate) fn compute_contact_geometry(partition: &mut Partition, params: &SolverParameters) {
        for node in &mut partition.nodes {
            if !node.multimaterial() {
                continue;
            }

            let total_mass: Real = node.materials.iter().map(|e| e.dofs.mass).sum();
            let total_displacement: Vector<Real> =
                node.materials.iter().map(|e| e.displacement).sum();

            for entry in &mut node.materials {
                let mass = entry.dofs.mass;
                let other_mass = total_mass - mass;
                if mass <= 0.0 || other_mass <= 0.0 {
                    continue;
                }

                // Approaching/separating proxy: displacement of the other
                // materials relative to this one.
                entry.separation = (total_displacement - entry.displacement) / other_mass
                    - entry.displacement / mass;

                // No normalization below the epsilon: a near-zero domain
                // gradient would otherwise blow up into NaNs.
                let magnitude = entry.domain_gradient.norm();
                if magnitude > params.contact_epsilon {
                    entry.normal = entry.domain_gradient / magnitude;
                }
            }
        }
    }

    /// Corrects the per-material nodal motion of one enriched node after
    /// integration, suppressing momentum exchange across an opening
    /// discontinuity and applying Coulomb friction where the sides are in
    /// contact.
    ///
    /// The base accumulators of the node already hold the all-material
    /// totals, so the center-of-mass velocity is simply the node velocity.
    pub(crate) fn resolve_contact(
        node: &mut MeshNode,
        params: &SolverParameters,
        registry: &DiscontinuityRegistry,
        dt: Real,
    ) {
        let center_velocity = *node.dofs.velocity();

        for entry in &mut node.materials {
            let mass = entry.dofs.mass;
            if mass <= 0.0 {
                continue;
            }

            // Unconstrained update of this material's field.
            entry.momentum_change = entry.dofs.force_total() * dt;
            let velocity_before = entry.dofs.momentum() / mass;
            let free_velocity = velocity_before + entry.momentum_change / mass;

            let mut velocity = free_velocity;
            let normal = entry.normal;

            if normal.norm() > 0.0 {
                let relative = free_velocity - center_velocity;
                let approach = relative.dot(&normal);
                let separating = entry.separation.dot(&normal) > params.separation_cutoff;

                if approach > 0.0 && !separating {
                    // Interface fields carry no crack surface, hence no
                    // friction.
                    let friction = match entry.material {
                        EnrichmentId::Side { column, .. } => registry.friction(column),
                        EnrichmentId::Interface(_) => 0.0,
                    };

                    let tangential = relative - normal * approach;
                    let tangential_norm = tangential.norm();

                    velocity = center_velocity + tangential;
                    if tangential_norm > 1.0e-10 {
                        velocity = center_velocity
                            + tangential / tangential_norm
                                * (tangential_norm - friction * approach).max(0.0);
                    }
                }
            }

            *entry.dofs.velocity_mut() = velocity;
            *entry.dofs.acceleration_mut() = (velocity - velocity_before) / dt;
            *entry.dofs.momentum_mut() = velocity * mass;
        }
    }
}
