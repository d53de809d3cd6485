use approx::assert_relative_eq;
use cleave3d::prelude::*;
use nalgebra::point;

#[test]
fn mass_reduction_matches_the_serial_sum() {
    for nranks in [1usize, 2, 4] {
        let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 0.5, [8, 2, 2]);
        let mut decomp = DomainDecomposition::new(grid, nranks).unwrap();
        let mut rng = oorandom::Rand64::new(42);

        // Synthetic per-holder contributions on every shared node.
        let shared: Vec<_> = decomp.shared_nodes().to_vec();
        let mut expected = vec![];
        for s in &shared {
            let mut total = 0.0;
            for &rank in &s.ranks {
                let m = 1.0 + rng.rand_float();
                decomp.partitions_mut()[rank].nodes[s.node].dofs.mass = m;
                total += m;
            }
            expected.push(total);
        }

        decomp
            .nodal_halo_exchange(
                |node| [node.dofs.mass],
                |node, reduced| node.dofs.mass = reduced[0],
            )
            .unwrap();

        // Every holder of a shared node must end up with the same global sum.
        for (s, total) in shared.iter().zip(expected.iter()) {
            for &rank in &s.ranks {
                let mass = decomp.partitions()[rank].nodes[s.node].dofs.mass;
                assert_relative_eq!(mass, *total, epsilon = 1.0e-12);
            }
        }
    }
}

#[test]
fn vector_quantities_reduce_componentwise() {
    let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [4, 1, 1]);
    let mut decomp = DomainDecomposition::new(grid, 2).unwrap();
    let mut rng = oorandom::Rand64::new(7);

    let shared: Vec<_> = decomp.shared_nodes().to_vec();
    let mut expected = vec![];
    for s in &shared {
        let mut total = [0.0; 3];
        for &rank in &s.ranks {
            let contribution = [rng.rand_float(), rng.rand_float(), rng.rand_float()];
            assert!(decomp.partitions_mut()[rank].nodes[s.node]
                .dofs
                .set_momentum(&contribution));
            for (acc, c) in total.iter_mut().zip(contribution.iter()) {
                *acc += *c;
            }
        }
        expected.push(total);
    }

    decomp
        .nodal_halo_exchange(
            |node| {
                let m = node.dofs.momentum();
                [m.x, m.y, m.z]
            },
            |node, reduced| {
                node.dofs.set_momentum(reduced);
            },
        )
        .unwrap();

    for (s, total) in shared.iter().zip(expected.iter()) {
        for &rank in &s.ranks {
            let momentum = decomp.partitions()[rank].nodes[s.node].dofs.momentum();
            for axis in 0..3 {
                assert_relative_eq!(momentum[axis], total[axis], epsilon = 1.0e-12);
            }
        }
    }
}

#[test]
fn non_shared_nodes_are_left_alone() {
    let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [4, 1, 1]);
    let mut decomp = DomainDecomposition::new(grid, 2).unwrap();

    let shared: Vec<_> = decomp.shared_nodes().to_vec();
    let interior = (0..decomp.grid().num_nodes())
        .find(|n| shared.iter().all(|s| s.node != *n))
        .unwrap();

    decomp.partitions_mut()[0].nodes[interior].dofs.mass = 3.0;
    decomp
        .nodal_halo_exchange(
            |node| [node.dofs.mass],
            |node, reduced| node.dofs.mass = reduced[0],
        )
        .unwrap();

    assert_eq!(decomp.partitions()[0].nodes[interior].dofs.mass, 3.0);
    assert_eq!(decomp.partitions()[1].nodes[interior].dofs.mass, 0.0);
}
