use crate::distributed::DomainDecomposition;
use crate::dynamics::solver::{
    ContainmentPolicy, SolverParameters, StepHooks, StressUpdateScheme,
};
use crate::dynamics::{MaterialSet, Particle};
use crate::math::{Real, Vector};
use anyhow::{bail, Context};
use rayon::prelude::*;

/// A batch of particles scheduled for runtime injection.
pub struct Injection {
    /// Simulation time at which the batch enters the mesh.
    pub time: Real,
    pub particles: Vec<Particle>,
    consumed: bool,
}

impl Injection {
    pub fn new(time: Real, particles: Vec<Particle>) -> Self {
        Self {
            time,
            particles,
            consumed: false,
        }
    }
}

/// A concentrated external force applied directly on a mesh node while
/// `start_time <= t < end_time`.
#[derive(Copy, Clone, Debug)]
pub struct ConcentratedForce {
    pub node: usize,
    pub force: Vector<Real>,
    pub start_time: Real,
    pub end_time: Real,
}

/// The explicit XMPM time-step controller.
///
/// `run` sequences the per-step phases in a strict order: particle→node
/// mapping, halo reductions, force computation, discontinuity-aware momentum
/// integration and particle relocation. The stress-update scheme decides,
/// once per step, whether stresses are computed before the force phase or
/// after the nodal solution.
pub struct ExplicitSolver {
    pub params: SolverParameters,
    pub registry: crate::geometry::DiscontinuityRegistry,
    pub injections: Vec<Injection>,
    pub nodal_forces: Vec<ConcentratedForce>,
    step_count: u64,
    time: Real,
}

impl ExplicitSolver {
    pub fn new(params: SolverParameters, registry: crate::geometry::DiscontinuityRegistry) -> Self {
        Self {
            params,
            registry,
            injections: vec![],
            nodal_forces: vec![],
            step_count: 0,
            time: 0.0,
        }
    }

    #[inline]
    pub fn current_step(&self) -> u64 {
        self.step_count
    }

    #[inline]
    pub fn time(&self) -> Real {
        self.time
    }

    /// Imprints one level-set column per registered discontinuity onto every
    /// particle of every partition. Any failure here is fatal.
    pub fn initialize_levelsets(
        &self,
        decomp: &mut DomainDecomposition,
    ) -> anyhow::Result<()> {
        for partition in decomp.partitions_mut() {
            let coordinates = partition.particles.coordinates();

            for (column, (id, surface)) in self.registry.iter().enumerate() {
                let mut values = vec![];
                surface
                    .compute_levelset(&coordinates, &mut values)
                    .with_context(|| {
                        format!("level-set initialization failed for discontinuity {}", id)
                    })?;
                partition.particles.assign_levelsets(column, &values);
            }
        }

        // Enrichment accumulators are partition-local, so contact on
        // boundary-plane nodes cannot see the other rank's side entries.
        let grid = decomp.grid();
        let cell_width = grid.cell_width();
        let planes: Vec<Real> = decomp
            .split_planes()
            .iter()
            .map(|&ix| grid.node_position(grid.node_id(ix, 0, 0)).x)
            .collect();
        for (column, (id, _)) in self.registry.iter().enumerate() {
            for &plane_x in &planes {
                if Self::levelset_straddles_plane(decomp, column, plane_x, cell_width) {
                    warn!(
                        "Discontinuity {} crosses the partition boundary at x = {}; \
                         contact on boundary-plane nodes is resolved partition-locally.",
                        id, plane_x
                    );
                }
            }
        }

        Ok(())
    }

    /// Whether both sides of level-set column `column` have particles within
    /// one cell width of the given partition split plane.
    fn levelset_straddles_plane(
        decomp: &DomainDecomposition,
        column: usize,
        plane_x: Real,
        cell_width: Real,
    ) -> bool {
        let mut positive = false;
        let mut negative = false;

        for partition in decomp.partitions() {
            for particle in partition.particles.iter() {
                if (particle.position.x - plane_x).abs() >= cell_width {
                    continue;
                }
                match particle.levelsets.get(column) {
                    Some(v) if *v < 0.0 => negative = true,
                    Some(_) => positive = true,
                    None => {}
                }
            }
        }

        positive && negative
    }

    /// Advances the simulation by `total_steps` explicit steps.
    pub fn run(
        &mut self,
        total_steps: u64,
        decomp: &mut DomainDecomposition,
        materials: &MaterialSet,
        hooks: &mut dyn StepHooks,
    ) -> anyhow::Result<()> {
        for _ in 0..total_steps {
            self.step(decomp, materials, hooks)
                .with_context(|| format!("explicit step {} failed", self.step_count))?;
        }
        Ok(())
    }

    /// One explicit step. Phases run in a strict order; the two fork/join
    /// sections cover tasks with disjoint read/write sets only.
    pub fn step(
        &mut self,
        decomp: &mut DomainDecomposition,
        materials: &MaterialSet,
        hooks: &mut dyn StepHooks,
    ) -> anyhow::Result<()> {
        let params = self.params;
        let dt = params.dt;
        let enriched = params.interface_mode || params.discontinuity_mode;
        let distributed = decomp.num_partitions() > 1;
        let t0 = instant::now();

        // 1. Periodic repartitioning, never at step 0.
        if params.repartition_frequency > 0
            && self.step_count > 0
            && self.step_count % params.repartition_frequency == 0
        {
            decomp.decompose(false);
        }

        // 2. Particle injection for the current time.
        self.inject_particles(decomp)?;

        // 3. Fork: nodal reset || shape-function evaluation. Disjoint state;
        // the join is mandatory before anything reads nodes or shape caches.
        {
            let (grid, partitions) = decomp.grid_and_partitions_mut();
            partitions.par_iter_mut().for_each(|partition| {
                let crate::distributed::Partition {
                    nodes, particles, ..
                } = partition;
                rayon::join(
                    || nodes.iter_mut().for_each(|node| node.reset()),
                    || Self::evaluate_shape_functions(grid, particles),
                );
            });
        }

        // 4. Enrichment storage + material tagging.
        if enriched {
            decomp
                .partitions_mut()
                .par_iter_mut()
                .for_each(|partition| Self::tag_material_presence(partition, &params));
        }

        // 5. Particle mass and momentum onto the nodes.
        decomp
            .partitions_mut()
            .par_iter_mut()
            .for_each(Self::map_mass_momentum);

        // 6. Halo reductions: mass first, then momentum. Never pipelined.
        if distributed {
            decomp.nodal_halo_exchange(
                |node| [node.dofs.mass],
                |node, reduced| node.dofs.mass = reduced[0],
            )?;
            decomp.nodal_halo_exchange(
                |node| {
                    let m = node.dofs.momentum();
                    [m.x, m.y, m.z]
                },
                |node, reduced| {
                    node.dofs.set_momentum(reduced);
                },
            )?;
        }

        decomp
            .partitions_mut()
            .par_iter_mut()
            .for_each(Self::compute_nodal_velocities);

        // 7. Multi-material mapping and contact geometry.
        if enriched {
            decomp.partitions_mut().par_iter_mut().for_each(|partition| {
                Self::map_multimaterial(partition, &params);
                Self::compute_contact_geometry(partition, &params);
            });
        }

        // 8. Update-stress-first fires before any force is mapped.
        if params.stress_update == StressUpdateScheme::UpdateStressFirst {
            Self::compute_stress_strain(decomp, materials, &params, dt);
        }

        // 9. Fork: external || internal force mapping (disjoint accumulators).
        {
            let time = self.time;
            let nodal_forces = &self.nodal_forces;
            let owners: Vec<usize> = nodal_forces
                .iter()
                .map(|f| decomp.node_owner(f.node))
                .collect();

            decomp.partitions_mut().par_iter_mut().for_each(|partition| {
                let concentrated = Self::active_concentrated_forces(
                    nodal_forces,
                    &owners,
                    partition.rank,
                    time,
                );
                Self::map_forces(partition, &params, &concentrated);
            });
        }

        // 10. Halo reductions: external, then internal force.
        if distributed {
            decomp.nodal_halo_exchange(
                |node| {
                    let f = node.dofs.force_external();
                    [f.x, f.y, f.z]
                },
                |node, reduced| {
                    node.dofs.set_force_external(reduced);
                },
            )?;
            decomp.nodal_halo_exchange(
                |node| {
                    let f = node.dofs.force_internal();
                    [f.x, f.y, f.z]
                },
                |node, reduced| {
                    node.dofs.set_force_internal(reduced);
                },
            )?;
        }

        // 11. Momentum integration, discontinuity-aware, active nodes only.
        {
            let registry = &self.registry;
            decomp
                .partitions_mut()
                .par_iter_mut()
                .for_each(|partition| Self::integrate_momentum(partition, &params, registry, dt));
        }

        // 12./13. Particle update and velocity constraints.
        decomp.partitions_mut().par_iter_mut().for_each(|partition| {
            Self::update_particles(partition, &params, dt);
            Self::apply_velocity_constraints(partition);
        });

        // 14. Update-stress-last fires after the nodal solution.
        if params.stress_update == StressUpdateScheme::UpdateStressLast {
            Self::compute_stress_strain(decomp, materials, &params, dt);
        }

        // 15. Relocate particles against the (possibly repartitioned) mesh.
        self.relocate_particles(decomp)?;

        // 16. Hand over particles that crossed a partition boundary.
        if distributed {
            decomp.transfer_halo_particles();
        }

        self.step_count += 1;
        self.time += dt;

        // 17. Output cadence.
        if params.output_frequency > 0 && self.step_count % params.output_frequency == 0 {
            hooks.on_output(self.step_count, decomp);
        }

        debug!(
            "Step {} computed in {}ms ({} particles).",
            self.step_count,
            instant::now() - t0,
            decomp.nparticles()
        );

        Ok(())
    }

    fn inject_particles(&mut self, decomp: &mut DomainDecomposition) -> anyhow::Result<()> {
        let registry = &self.registry;
        let time = self.time;

        for injection in &mut self.injections {
            if injection.consumed || time < injection.time {
                continue;
            }

            let mut particles = std::mem::take(&mut injection.particles);
            injection.consumed = true;

            if !registry.is_empty() {
                let coordinates: Vec<_> = particles.iter().map(|p| p.position).collect();
                for (column, (id, surface)) in registry.iter().enumerate() {
                    let mut values = vec![];
                    surface
                        .compute_levelset(&coordinates, &mut values)
                        .with_context(|| {
                            format!("level-set imprint failed for discontinuity {}", id)
                        })?;
                    for (particle, value) in particles.iter_mut().zip(values.iter()) {
                        if particle.levelsets.len() <= column {
                            particle.levelsets.resize(column + 1, 0.0);
                        }
                        particle.levelsets[column] = *value;
                    }
                }
            }

            let n = decomp.insert_particles(particles);
            info!("Injected {} particle(s) at t = {}.", n, time);
        }

        Ok(())
    }

    /// Locates every particle; unlocatable ones abort the run under strict
    /// containment, or are removed from the mesh otherwise.
    fn relocate_particles(&self, decomp: &mut DomainDecomposition) -> anyhow::Result<()> {
        let (grid, partitions) = decomp.grid_and_partitions_mut();

        for partition in partitions {
            let mut lost = 0;
            for particle in partition.particles.iter_mut() {
                particle.cell = grid.locate(&particle.position);
                if particle.cell.is_none() {
                    lost += 1;
                }
            }

            if lost == 0 {
                continue;
            }

            match self.params.containment {
                ContainmentPolicy::Strict => {
                    bail!(
                        "{} particle(s) left the mesh domain on partition {}",
                        lost,
                        partition.rank
                    );
                }
                ContainmentPolicy::RemoveLost => {
                    warn!(
                        "Removing {} particle(s) that left the mesh domain on partition {}.",
                        lost,
                        partition.rank
                    );
                    partition.particles.retain(|p| p.cell.is_some());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::ExplicitSolver;
    use crate::distributed::DomainDecomposition;
    use crate::dynamics::Particle;
    use crate::geometry::BackgroundGrid;
    use na::point;

    #[test]
    fn straddle_detection_needs_both_signs_near_the_plane() {
        let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [8, 2, 2]);
        let mut decomp = DomainDecomposition::new(grid, 2).unwrap();

        let mut a = Particle::new(0, point![3.6, 0.5, 0.5], 1.0e-3, 1000.0);
        a.levelsets = vec![-0.4];
        let mut b = Particle::new(0, point![4.4, 0.5, 0.5], 1.0e-3, 1000.0);
        b.levelsets = vec![0.4];
        let mut far = Particle::new(0, point![7.5, 0.5, 0.5], 1.0e-3, 1000.0);
        far.levelsets = vec![0.5];
        decomp.insert_particles(vec![a, b, far]);

        assert!(ExplicitSolver::levelset_straddles_plane(&decomp, 0, 4.0, 1.0));
        // Only the positive side sits near x = 7.
        assert!(!ExplicitSolver::levelset_straddles_plane(&decomp, 0, 7.0, 1.0));
    }
}
