use crate::dynamics::Particle;
use crate::math::{Point, Real};

/// The particles owned by one partition.
#[derive(Clone, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    next_id: u64,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self {
            particles: vec![],
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    /// Inserts a particle, assigning it a fresh id unless it already carries
    /// one (particles transferred between partitions keep their identity).
    pub fn insert(&mut self, mut particle: Particle) -> u64 {
        if particle.id == u64::MAX {
            particle.id = self.next_id;
            self.next_id += 1;
        } else {
            self.next_id = self.next_id.max(particle.id + 1);
        }

        let id = particle.id;
        self.particles.push(particle);
        id
    }

    pub fn insert_batch(&mut self, particles: Vec<Particle>) {
        for particle in particles {
            self.insert(particle);
        }
    }

    pub fn remove(&mut self, id: u64) -> Option<Particle> {
        let i = self.particles.iter().position(|p| p.id == id)?;
        Some(self.particles.swap_remove(i))
    }

    pub fn retain(&mut self, predicate: impl Fn(&Particle) -> bool) {
        self.particles.retain(|p| predicate(p));
    }

    /// Drains every particle out of the set (used when redistributing across
    /// partitions).
    pub fn drain(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.particles)
    }

    pub fn coordinates(&self) -> Vec<Point<Real>> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Imprints one level-set column onto every particle. `values` must hold
    /// one value per particle, in iteration order.
    pub fn assign_levelsets(&mut self, column: usize, values: &[Real]) {
        assert_eq!(
            values.len(),
            self.particles.len(),
            "one level-set value per particle expected"
        );

        for (particle, value) in self.particles.iter_mut().zip(values.iter()) {
            if particle.levelsets.len() <= column {
                particle.levelsets.resize(column + 1, 0.0);
            }
            particle.levelsets[column] = *value;
        }
    }
}

#[cfg(test)]
mod test {
    use super::ParticleSet;
    use crate::dynamics::Particle;
    use na::point;

    fn particle() -> Particle {
        Particle::new(0, point![0.5, 0.5, 0.5], 1.0e-3, 1000.0)
    }

    #[test]
    fn ids_are_stable_across_removal() {
        let mut set = ParticleSet::new();
        let a = set.insert(particle());
        let b = set.insert(particle());
        let c = set.insert(particle());
        assert_eq!((a, b, c), (0, 1, 2));

        set.remove(b).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.iter().any(|p| p.id == a));
        assert!(set.iter().any(|p| p.id == c));

        // Fresh inserts never reuse a live range.
        let d = set.insert(particle());
        assert_eq!(d, 3);
    }

    #[test]
    fn levelset_columns_grow_on_demand() {
        let mut set = ParticleSet::new();
        set.insert(particle());
        set.insert(particle());

        set.assign_levelsets(1, &[0.25, -0.5]);
        let levels: Vec<_> = set.iter().map(|p| p.levelsets.clone()).collect();
        assert_eq!(levels[0], vec![0.0, 0.25]);
        assert_eq!(levels[1], vec![0.0, -0.5]);
    }
}
