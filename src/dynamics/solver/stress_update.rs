use super::ExplicitSolver;
use crate::distributed::{DomainDecomposition, Partition};
use crate::dynamics::solver::SolverParameters;
use crate::dynamics::MaterialSet;
use crate::math::{Matrix, Real};
use crate::utils;
use rayon::prelude::*;

impl ExplicitSolver {
    /// Strain and volume update, optional pressure smoothing, then the
    /// constitutive stress update. Runs exactly once per step, either before
    /// force mapping or after the nodal solution depending on
    /// `stress_update_order`.
    pub(crate) fn compute_stress_strain(
        decomp: &mut DomainDecomposition,
        materials: &MaterialSet,
        params: &SolverParameters,
        dt: Real,
    ) {
        let (_, partitions) = decomp.grid_and_partitions_mut();

        partitions.par_iter_mut().for_each(|partition| {
            let strain_increments = Self::update_strain_and_volume(partition, params, dt);

            if params.pressure_smoothing {
                Self::smooth_pressure(partition, params);
            }

            for (particle, de) in partition
                .particles
                .iter_mut()
                .zip(strain_increments.iter())
            {
                let model = &materials[particle.material].constitutive_model;
                model.update_stress(particle, de);
            }
        });
    }

    fn update_strain_and_volume(
        partition: &mut Partition,
        params: &SolverParameters,
        dt: Real,
    ) -> Vec<Matrix<Real>> {
        let Partition {
            nodes, particles, ..
        } = partition;
        let mut increments = Vec::with_capacity(particles.len());

        for particle in particles.iter_mut() {
            if particle.cell.is_none() {
                increments.push(Matrix::zeros());
                continue;
            }
            let materials = Self::enrichment_materials(particle, params);

            let mut velocity_gradient = Matrix::zeros();
            for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                let gradient = particle.shape.gradients[k];
                let (v, _) = Self::nodal_fields(&nodes[*node_id], &materials);
                velocity_gradient += v * gradient.transpose();
            }

            let de = utils::strain_rate(&velocity_gradient) * dt;
            particle.strain += de;
            particle.volume *= 1.0 + de.trace();
            increments.push(de);
        }

        increments
    }

    /// Replaces each particle's spherical stress by the mass-weighted nodal
    /// pressure average interpolated back at the particle.
    fn smooth_pressure(partition: &mut Partition, _params: &SolverParameters) {
        let Partition {
            nodes, particles, ..
        } = partition;

        let mut nodal_pressure = vec![0.0; nodes.len()];
        let mut nodal_mass = vec![0.0; nodes.len()];

        for particle in particles.iter() {
            if particle.cell.is_none() {
                continue;
            }
            for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                let w = particle.shape.weights[k];
                nodal_pressure[*node_id] += w * particle.mass * particle.pressure();
                nodal_mass[*node_id] += w * particle.mass;
            }
        }

        for particle in particles.iter_mut() {
            if particle.cell.is_none() {
                continue;
            }
            let mut smoothed = 0.0;
            for (k, node_id) in particle.shape.nodes.iter().enumerate() {
                let w = particle.shape.weights[k];
                smoothed += w * nodal_pressure[*node_id] * utils::inv_exact(nodal_mass[*node_id]);
            }
            particle.assign_pressure(smoothed);
        }
    }
}
