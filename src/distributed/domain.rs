use crate::dynamics::{MeshNode, Particle, ParticleSet};
use crate::geometry::BackgroundGrid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("cannot decompose {ncells} cell slabs over {nranks} partitions")]
    TooManyPartitions { ncells: usize, nranks: usize },
    #[error("at least one partition is required")]
    NoPartitions,
}

/// A logical owner of a disjoint x slab of mesh cells.
///
/// Each partition keeps its own authoritative copy of every nodal
/// accumulator it touches; boundary-plane nodes shared with the adjacent
/// partition only become consistent through the halo exchange protocol.
pub struct Partition {
    pub rank: usize,
    pub particles: ParticleSet,
    pub nodes: Vec<MeshNode>,
}

/// A boundary node held by two adjacent partitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SharedNode {
    pub node: usize,
    pub ranks: [usize; 2],
}

/// Slab domain decomposition of the background grid along the x axis.
pub struct DomainDecomposition {
    grid: BackgroundGrid,
    partitions: Vec<Partition>,
    /// Cell-plane indices along x; partition `p` owns cells with
    /// `splits[p] <= ix < splits[p + 1]`.
    splits: Vec<usize>,
    shared: Vec<SharedNode>,
    /// Global id counter; per-partition counters would collide once
    /// particles transfer across ranks.
    next_particle_id: u64,
}

impl DomainDecomposition {
    pub fn new(grid: BackgroundGrid, nranks: usize) -> Result<Self, DomainError> {
        if nranks == 0 {
            return Err(DomainError::NoPartitions);
        }
        let ncells_x = grid.ncells()[0];
        if ncells_x < nranks {
            return Err(DomainError::TooManyPartitions {
                ncells: ncells_x,
                nranks,
            });
        }

        let num_nodes = grid.num_nodes();
        let partitions = (0..nranks)
            .map(|rank| Partition {
                rank,
                particles: ParticleSet::new(),
                nodes: vec![MeshNode::default(); num_nodes],
            })
            .collect();

        let mut decomp = Self {
            grid,
            partitions,
            splits: vec![],
            shared: vec![],
            next_particle_id: 0,
        };
        decomp.apply_splits(Self::uniform_splits(ncells_x, nranks));
        Ok(decomp)
    }

    #[inline]
    pub fn grid(&self) -> &BackgroundGrid {
        &self.grid
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    #[inline]
    pub fn partitions_mut(&mut self) -> &mut [Partition] {
        &mut self.partitions
    }

    /// Simultaneous access to the immutable grid topology and the mutable
    /// partition states, for the partition-parallel solver phases.
    #[inline]
    pub fn grid_and_partitions_mut(&mut self) -> (&BackgroundGrid, &mut [Partition]) {
        (&self.grid, &mut self.partitions)
    }

    #[inline]
    pub fn shared_nodes(&self) -> &[SharedNode] {
        &self.shared
    }

    /// Interior split-plane x indices between adjacent ranks.
    pub fn split_planes(&self) -> &[usize] {
        if self.splits.len() <= 2 {
            &[]
        } else {
            &self.splits[1..self.splits.len() - 1]
        }
    }

    pub fn nparticles(&self) -> usize {
        self.partitions.iter().map(|p| p.particles.len()).sum()
    }

    /// The rank owning a given cell.
    pub fn owner_of_cell(&self, cell: usize) -> usize {
        self.owner_of_slab(self.grid.cell_x(cell))
    }

    fn owner_of_slab(&self, ix: usize) -> usize {
        // splits is short (P + 1 entries); a linear scan is fine.
        for p in 0..self.partitions.len() {
            if ix < self.splits[p + 1] {
                return p;
            }
        }
        self.partitions.len() - 1
    }

    /// The rank owning a given node. Shared boundary-plane nodes belong to
    /// the right-hand partition; ownership matters for contributions that
    /// must be applied exactly once, like concentrated nodal forces.
    pub fn node_owner(&self, node: usize) -> usize {
        let nnodes_x = self.grid.nnodes()[0];
        let ix = node % nnodes_x;
        if ix >= self.grid.ncells()[0] {
            return self.partitions.len() - 1;
        }
        self.owner_of_slab(ix)
    }

    /// Distributes particles to the partitions owning their cell, assigning
    /// fresh globally unique ids where needed. Particles outside the mesh
    /// are dropped with a warning. Returns the number of particles actually
    /// inserted.
    pub fn insert_particles(&mut self, particles: Vec<Particle>) -> usize {
        let mut inserted = 0;

        for mut particle in particles {
            match self.grid.locate(&particle.position) {
                Some(cell) => {
                    if particle.id == u64::MAX {
                        particle.id = self.next_particle_id;
                        self.next_particle_id += 1;
                    }
                    particle.cell = Some(cell);
                    let owner = self.owner_of_cell(cell);
                    self.partitions[owner].particles.insert(particle);
                    inserted += 1;
                }
                None => {
                    warn!(
                        "Dropping particle at {:?}: outside the mesh domain.",
                        particle.position
                    );
                }
            }
        }

        inserted
    }

    /// (Re)partitions the domain. On the initial call the slabs are uniform;
    /// afterwards the split planes are rebalanced so every partition owns a
    /// comparable number of particles, and all particles are redistributed to
    /// their new owners.
    pub fn decompose(&mut self, initial_step: bool) {
        let ncells_x = self.grid.ncells()[0];
        let nranks = self.partitions.len();

        let splits = if initial_step || self.nparticles() == 0 {
            Self::uniform_splits(ncells_x, nranks)
        } else {
            self.balanced_splits()
        };

        info!("Domain decomposition split planes: {:?}", splits);
        self.apply_splits(splits);

        let mut all_particles = vec![];
        for partition in &mut self.partitions {
            all_particles.append(&mut partition.particles.drain());
        }
        self.insert_particles(all_particles);
    }

    /// Moves every particle whose located cell is owned by another rank into
    /// that rank's partition. Particle ids are preserved across the move.
    pub fn transfer_halo_particles(&mut self) {
        let nranks = self.partitions.len();
        let mut outgoing: Vec<Vec<Particle>> = (0..nranks).map(|_| vec![]).collect();

        for p in 0..nranks {
            let rank = self.partitions[p].rank;
            let mut keep = vec![];
            for particle in self.partitions[p].particles.drain() {
                let target = particle
                    .cell
                    .map(|cell| self.owner_of_cell(cell))
                    .unwrap_or(rank);
                if target == rank {
                    keep.push(particle);
                } else {
                    outgoing[target].push(particle);
                }
            }
            self.partitions[p].particles.insert_batch(keep);
        }

        for (target, particles) in outgoing.into_iter().enumerate() {
            if !particles.is_empty() {
                debug!(
                    "Transferring {} particle(s) to partition {}.",
                    particles.len(),
                    target
                );
                self.partitions[target].particles.insert_batch(particles);
            }
        }
    }

    fn uniform_splits(ncells_x: usize, nranks: usize) -> Vec<usize> {
        (0..=nranks).map(|p| p * ncells_x / nranks).collect()
    }

    /// Split planes equalizing the cumulative particle count per slab.
    fn balanced_splits(&self) -> Vec<usize> {
        let ncells_x = self.grid.ncells()[0];
        let nranks = self.partitions.len();

        let mut counts = vec![0usize; ncells_x];
        for partition in &self.partitions {
            for particle in partition.particles.iter() {
                if let Some(cell) = particle.cell {
                    counts[self.grid.cell_x(cell)] += 1;
                }
            }
        }

        let total: usize = counts.iter().sum();
        let mut splits = vec![0];
        let mut cumulative = 0;

        for x in 0..ncells_x {
            cumulative += counts[x];
            let p = splits.len();
            if p < nranks && cumulative * nranks >= total * p {
                // Leave enough slabs for the remaining partitions.
                let split = (x + 1).min(ncells_x - (nranks - p));
                if split > *splits.last().unwrap() {
                    splits.push(split);
                }
            }
        }
        while splits.len() < nranks {
            let split = splits.last().unwrap() + 1;
            splits.push(split);
        }
        splits.push(ncells_x);

        splits
    }

    fn apply_splits(&mut self, splits: Vec<usize>) {
        debug_assert_eq!(splits.len(), self.partitions.len() + 1);
        self.splits = splits;
        self.shared.clear();

        let nnodes = self.grid.nnodes();
        for p in 1..self.partitions.len() {
            let ix = self.splits[p];
            for k in 0..nnodes[2] {
                for j in 0..nnodes[1] {
                    self.shared.push(SharedNode {
                        node: self.grid.node_id(ix, j, k),
                        ranks: [p - 1, p],
                    });
                }
            }
        }
    }
}
