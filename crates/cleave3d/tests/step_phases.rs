use approx::assert_relative_eq;
use cleave3d::prelude::*;
use nalgebra::{point, vector};

fn colliding_pair(stress_update: StressUpdateScheme) -> (DomainDecomposition, MaterialSet, ExplicitSolver) {
    let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [4, 4, 4]);
    let mut decomp = DomainDecomposition::new(grid, 1).unwrap();

    let mut materials = MaterialSet::new();
    let material =
        materials.insert(ParticleMaterial::new(LinearElasticity::from_lame(1.0e6, 1.0e6)));

    // Two particles approaching each other: a non-uniform velocity field.
    let mut a = Particle::new(material, point![1.25, 1.5, 1.5], 1.0e-3, 1000.0);
    a.velocity = vector![1.0, 0.0, 0.0];
    let mut b = Particle::new(material, point![1.75, 1.5, 1.5], 1.0e-3, 1000.0);
    b.velocity = vector![-1.0, 0.0, 0.0];
    decomp.insert_particles(vec![a, b]);

    let mut params = SolverParameters::default();
    params.gravity = vector![0.0, 0.0, 0.0];
    params.stress_update = stress_update;
    let solver = ExplicitSolver::new(params, DiscontinuityRegistry::new());
    (decomp, materials, solver)
}

#[test]
fn nodal_mass_is_conserved_by_the_mapping() {
    let (mut decomp, materials, mut solver) =
        colliding_pair(StressUpdateScheme::UpdateStressLast);

    // Several steps: the accumulators must be rebuilt from scratch each step,
    // never compounded across steps.
    for _ in 0..3 {
        solver.step(&mut decomp, &materials, &mut ()).unwrap();

        // Partition of unity: the mapped nodal masses sum to the particle
        // masses.
        let nodal_mass: f64 = decomp.partitions()[0]
            .nodes
            .iter()
            .map(|n| n.dofs.mass)
            .sum();
        let particle_mass: f64 = decomp.partitions()[0]
            .particles
            .iter()
            .map(|p| p.mass)
            .sum();
        assert_relative_eq!(nodal_mass, particle_mass, epsilon = 1.0e-12);
    }
}

#[test]
fn compression_builds_negative_stress() {
    let (mut decomp, materials, mut solver) =
        colliding_pair(StressUpdateScheme::UpdateStressLast);
    solver.step(&mut decomp, &materials, &mut ()).unwrap();

    for particle in decomp.partitions()[0].particles.iter() {
        assert!(particle.stress[(0, 0)] < 0.0);
        assert!(particle.pressure() > 0.0);
    }
}

#[test]
fn update_stress_first_feeds_forces_into_the_same_step() {
    // Under update-stress-first the compressive stress of the approaching
    // pair is mapped to internal forces within the step, decelerating both
    // particles. Under update-stress-last no force exists yet on step one,
    // so the velocities pass through unchanged.
    let run = |scheme| {
        let (mut decomp, materials, mut solver) = colliding_pair(scheme);
        solver.step(&mut decomp, &materials, &mut ()).unwrap();
        decomp.partitions()[0]
            .particles
            .iter()
            .map(|p| p.velocity.x)
            .collect::<Vec<_>>()
    };

    let first = run(StressUpdateScheme::UpdateStressFirst);
    let last = run(StressUpdateScheme::UpdateStressLast);

    for v in &last {
        assert_relative_eq!(v.abs(), 1.0, epsilon = 1.0e-12);
    }
    for v in &first {
        assert!(v.abs() < 1.0);
        assert!(v.abs() > 0.5);
    }
}

#[test]
fn velocity_constraints_override_the_nodal_solution() {
    let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [4, 4, 4]);
    let mut decomp = DomainDecomposition::new(grid, 1).unwrap();

    let mut materials = MaterialSet::new();
    let material = materials.insert(ParticleMaterial::new(LinearElasticity::new(1.0e7, 0.3)));

    let mut particle = Particle::new(material, point![2.25, 2.25, 2.25], 1.0e-3, 1000.0);
    particle.velocity_constraint = Some((2, 0.0));
    decomp.insert_particles(vec![particle]);

    let params = SolverParameters::default();
    let mut solver = ExplicitSolver::new(params, DiscontinuityRegistry::new());
    solver.run(5, &mut decomp, &materials, &mut ()).unwrap();

    // Gravity pulls along -z, the constraint pins the component back to zero.
    let particle = decomp.partitions()[0].particles.iter().next().unwrap();
    assert_eq!(particle.velocity.z, 0.0);
}
