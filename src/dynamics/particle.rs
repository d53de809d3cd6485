use crate::dynamics::{EnrichmentId, MaterialHandle};
use crate::math::{Matrix, Point, Real, Vector};

/// Cached shape-function evaluation of a particle against its cell, valid
/// for the current step only.
#[derive(Copy, Clone, Debug)]
pub struct ShapeCache {
    pub nodes: [usize; 8],
    pub weights: [Real; 8],
    pub gradients: [Vector<Real>; 8],
}

impl Default for ShapeCache {
    fn default() -> Self {
        Self {
            nodes: [0; 8],
            weights: [0.0; 8],
            gradients: [Vector::zeros(); 8],
        }
    }
}

/// A material point: carries the full physical state and is advected across
/// the background mesh every step.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Stable id, assigned by the [`crate::dynamics::ParticleSet`].
    pub id: u64,
    pub material: MaterialHandle,

    pub mass: Real,
    pub volume: Real,

    pub position: Point<Real>,
    pub velocity: Vector<Real>,
    /// Displacement accumulated since the start of the simulation.
    pub displacement: Vector<Real>,

    pub stress: Matrix<Real>,
    pub strain: Matrix<Real>,

    /// Surface traction applied to this particle, as a force vector.
    pub traction: Option<Vector<Real>>,
    /// Per-component velocity boundary constraint: `(component, value)`.
    pub velocity_constraint: Option<(usize, Real)>,

    /// One signed-distance value per registered discontinuity, in registry
    /// column order.
    pub levelsets: Vec<Real>,

    /// Cell containing this particle, updated by the relocation phase.
    pub cell: Option<usize>,
    pub shape: ShapeCache,
}

impl Particle {
    pub fn new(material: MaterialHandle, position: Point<Real>, volume: Real, density: Real) -> Self {
        Self {
            id: u64::MAX,
            material,
            mass: volume * density,
            volume,
            position,
            velocity: Vector::zeros(),
            displacement: Vector::zeros(),
            stress: Matrix::zeros(),
            strain: Matrix::zeros(),
            traction: None,
            velocity_constraint: None,
            levelsets: vec![],
            cell: None,
            shape: ShapeCache::default(),
        }
    }

    pub fn density(&self) -> Real {
        self.mass / self.volume
    }

    /// Mean pressure, positive in compression.
    pub fn pressure(&self) -> Real {
        -self.stress.trace() / 3.0
    }

    /// Replaces the spherical part of the stress so the particle carries the
    /// given pressure, keeping the deviatoric part untouched.
    pub fn assign_pressure(&mut self, pressure: Real) {
        let current = self.pressure();
        for i in 0..3 {
            self.stress[(i, i)] += current - pressure;
        }
    }

    /// The enrichment field of this particle with respect to level-set
    /// column `column`: each discontinuity splits particles into two sides
    /// by level-set sign.
    pub fn side_material(&self, column: usize) -> EnrichmentId {
        EnrichmentId::Side {
            column,
            negative: self.levelsets.get(column).copied().unwrap_or(0.0) < 0.0,
        }
    }
}
