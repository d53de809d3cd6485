use cleave3d::prelude::*;
use nalgebra::{point, vector};

fn escaping_setup(containment: ContainmentPolicy) -> (DomainDecomposition, MaterialSet, ExplicitSolver) {
    let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [4, 4, 4]);
    let mut decomp = DomainDecomposition::new(grid, 1).unwrap();

    let mut materials = MaterialSet::new();
    let material = materials.insert(ParticleMaterial::new(LinearElasticity::new(1.0e7, 0.3)));

    // One particle stays put, the other leaves the domain within one step.
    let stationary = Particle::new(material, point![0.5, 0.5, 0.5], 1.0e-3, 1000.0);
    let mut escaper = Particle::new(material, point![2.5, 2.5, 2.5], 1.0e-3, 1000.0);
    escaper.velocity = vector![1000.0, 0.0, 0.0];
    decomp.insert_particles(vec![stationary, escaper]);

    let mut params = SolverParameters::default();
    params.gravity = vector![0.0, 0.0, 0.0];
    params.dt = 1.0e-2;
    params.containment = containment;

    let solver = ExplicitSolver::new(params, DiscontinuityRegistry::new());
    (decomp, materials, solver)
}

#[test]
fn strict_containment_aborts_the_run() {
    let (mut decomp, materials, mut solver) = escaping_setup(ContainmentPolicy::Strict);
    let mut pipeline = XmpmPipeline::new();

    let result = pipeline.run(1, &mut solver, &mut decomp, &materials, &mut ());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("left the mesh domain"), "{}", message);
}

#[test]
fn transferred_escapees_never_take_residents_with_them() {
    // The escaper crosses the split plane into the resident's partition,
    // then leaves the mesh the following step. Removal must hit the escaper
    // only, even though both particles were the first insert of their rank.
    let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [8, 2, 2]);
    let mut decomp = DomainDecomposition::new(grid, 2).unwrap();

    let mut materials = MaterialSet::new();
    let material = materials.insert(ParticleMaterial::new(LinearElasticity::new(1.0e7, 0.3)));

    let resident = Particle::new(material, point![4.5, 0.5, 0.5], 1.0e-3, 1000.0);
    let mut escaper = Particle::new(material, point![2.5, 0.5, 0.5], 1.0e-3, 1000.0);
    escaper.velocity = vector![500.0, 0.0, 0.0];
    decomp.insert_particles(vec![resident, escaper]);

    let mut params = SolverParameters::default();
    params.gravity = vector![0.0, 0.0, 0.0];
    params.dt = 1.0e-2;
    params.containment = ContainmentPolicy::RemoveLost;

    let mut solver = ExplicitSolver::new(params, DiscontinuityRegistry::new());
    let mut pipeline = XmpmPipeline::new();
    pipeline
        .run(2, &mut solver, &mut decomp, &materials, &mut ())
        .unwrap();

    assert_eq!(decomp.nparticles(), 1);
    let survivor = decomp.partitions()[1].particles.iter().next().unwrap();
    assert_eq!(survivor.position.x, 4.5);
    assert!(survivor.velocity.norm() < 1.0e-9);
}

#[test]
fn remove_lost_drops_exactly_the_escapees() {
    let (mut decomp, materials, mut solver) = escaping_setup(ContainmentPolicy::RemoveLost);
    let mut pipeline = XmpmPipeline::new();

    pipeline
        .run(1, &mut solver, &mut decomp, &materials, &mut ())
        .unwrap();

    assert_eq!(decomp.nparticles(), 1);
    let survivor = decomp.partitions()[0].particles.iter().next().unwrap();
    assert!(survivor.velocity.norm() < 1.0e-9);
    assert!(decomp.grid().locate(&survivor.position).is_some());
}
