use crate::distributed::DomainDecomposition;
use crate::dynamics::MeshNode;
use crate::math::Real;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HaloError {
    #[error("partition {rank} does not hold shared node {node}: mismatched node topology")]
    TopologyMismatch { rank: usize, node: usize },
}

impl DomainDecomposition {
    /// Reduce-and-broadcast of one nodal quantity across partitions.
    ///
    /// For every boundary node shared between partitions, gathers each
    /// partition's local contribution through `getter`, reduces by summation
    /// and hands the reduced total back to every holding partition through
    /// `updater`. The call blocks until every shared node is consistent: no
    /// operation depending on the exchanged quantity may run before this
    /// returns.
    ///
    /// Must be invoked once per quantity per step (mass, then momentum, then
    /// the force accumulators), never pipelined across quantities.
    pub fn nodal_halo_exchange<const W: usize>(
        &mut self,
        getter: impl Fn(&MeshNode) -> [Real; W],
        updater: impl Fn(&mut MeshNode, &[Real; W]),
    ) -> Result<(), HaloError> {
        if self.num_partitions() == 1 {
            return Ok(());
        }

        for i in 0..self.shared_nodes().len() {
            let shared = self.shared_nodes()[i];
            let mut reduced = [0.0; W];

            for &rank in &shared.ranks {
                let node = self.partitions()[rank]
                    .nodes
                    .get(shared.node)
                    .ok_or(HaloError::TopologyMismatch {
                        rank,
                        node: shared.node,
                    })?;
                let contribution = getter(node);
                for (acc, c) in reduced.iter_mut().zip(contribution.iter()) {
                    *acc += *c;
                }
            }

            for &rank in &shared.ranks {
                let node = &mut self.partitions_mut()[rank].nodes[shared.node];
                updater(node, &reduced);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::distributed::DomainDecomposition;
    use crate::geometry::BackgroundGrid;
    use na::point;

    #[test]
    fn reduction_is_a_global_sum() {
        let grid = BackgroundGrid::new(point![0.0, 0.0, 0.0], 1.0, [4, 1, 1]);
        let mut decomp = DomainDecomposition::new(grid, 2).unwrap();

        let shared: Vec<_> = decomp.shared_nodes().to_vec();
        assert!(!shared.is_empty());

        for (i, s) in shared.iter().enumerate() {
            decomp.partitions_mut()[s.ranks[0]].nodes[s.node].dofs.mass = 1.0 + i as f64;
            decomp.partitions_mut()[s.ranks[1]].nodes[s.node].dofs.mass = 10.0;
        }

        decomp
            .nodal_halo_exchange(
                |node| [node.dofs.mass],
                |node, reduced| node.dofs.mass = reduced[0],
            )
            .unwrap();

        for (i, s) in shared.iter().enumerate() {
            for &rank in &s.ranks {
                let mass = decomp.partitions()[rank].nodes[s.node].dofs.mass;
                assert_eq!(mass, 11.0 + i as f64);
            }
        }
    }
}
