use crate::dynamics::models::ConstitutiveModel;
use crate::dynamics::Particle;
use crate::math::{Matrix, Real};
use crate::utils;

/// Isotropic linear elasticity in incremental (hypoelastic) form.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LinearElasticity {
    pub lambda: Real,
    pub mu: Real,
}

impl LinearElasticity {
    pub fn new(young_modulus: Real, poisson_ratio: Real) -> Self {
        let (lambda, mu) = utils::lame_lambda_mu(young_modulus, poisson_ratio);
        Self { lambda, mu }
    }

    pub fn from_lame(lambda: Real, mu: Real) -> Self {
        Self { lambda, mu }
    }
}

impl ConstitutiveModel for LinearElasticity {
    fn update_stress(&self, particle: &mut Particle, strain_increment: &Matrix<Real>) {
        let stress_increment = Matrix::identity() * (self.lambda * strain_increment.trace())
            + strain_increment * (2.0 * self.mu);
        particle.stress += stress_increment;
    }
}

#[cfg(test)]
mod test {
    use super::LinearElasticity;
    use crate::dynamics::models::ConstitutiveModel;
    use crate::dynamics::Particle;
    use crate::math::Matrix;
    use na::point;

    #[test]
    fn uniaxial_strain_increment() {
        let model = LinearElasticity::from_lame(1.0e6, 2.0e6);
        let mut particle = Particle::new(0, point![0.0, 0.0, 0.0], 1.0, 1000.0);

        let mut de = Matrix::zeros();
        de[(0, 0)] = 1.0e-4;
        model.update_stress(&mut particle, &de);

        // sigma_xx = (lambda + 2 mu) e, sigma_yy = sigma_zz = lambda e.
        assert!((particle.stress[(0, 0)] - 500.0).abs() < 1.0e-9);
        assert!((particle.stress[(1, 1)] - 100.0).abs() < 1.0e-9);
        assert!((particle.stress[(2, 2)] - 100.0).abs() < 1.0e-9);
        assert_eq!(particle.stress[(0, 1)], 0.0);
    }
}
