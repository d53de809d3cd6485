use crate::dynamics::Particle;
use crate::math::{Matrix, Real};

/// The stress-strain law of a material.
pub trait ConstitutiveModel: Send + Sync {
    /// Updates the particle stress from the strain increment of the step.
    fn update_stress(&self, particle: &mut Particle, strain_increment: &Matrix<Real>);

    /// Mean pressure carried by the particle, positive in compression.
    fn pressure(&self, particle: &Particle) -> Real {
        particle.pressure()
    }
}
