use crate::math::{Real, Vector};
use na::vector;

/// Trilinear shape functions over one hexahedral background cell.
///
/// `xi` is the particle position expressed in the local coordinates of the
/// cell, each component in `[0, 1]`. Weights and gradients are produced for
/// the 8 cell corners in the order of [`LinearKernel::CORNERS`].
pub struct LinearKernel;

impl LinearKernel {
    /// Corner shifts of a hexahedral cell, relative to its min corner.
    pub const CORNERS: [[usize; 3]; 8] = [
        [0, 0, 0],
        [1, 0, 0],
        [0, 1, 0],
        [1, 1, 0],
        [0, 0, 1],
        [1, 0, 1],
        [0, 1, 1],
        [1, 1, 1],
    ];

    #[inline(always)]
    fn eval_corner(xi: Real, corner: usize) -> Real {
        if corner == 0 {
            1.0 - xi
        } else {
            xi
        }
    }

    #[inline(always)]
    fn eval_corner_derivative(corner: usize) -> Real {
        if corner == 0 {
            -1.0
        } else {
            1.0
        }
    }

    #[inline(always)]
    pub fn weights(xi: &Vector<Real>) -> [Real; 8] {
        let mut out = [0.0; 8];
        for (i, c) in Self::CORNERS.iter().enumerate() {
            out[i] = Self::eval_corner(xi.x, c[0])
                * Self::eval_corner(xi.y, c[1])
                * Self::eval_corner(xi.z, c[2]);
        }
        out
    }

    /// Gradients of the corner weights with respect to world coordinates,
    /// for a cell of width `h`.
    #[inline(always)]
    pub fn gradients(xi: &Vector<Real>, h: Real) -> [Vector<Real>; 8] {
        let inv_h = 1.0 / h;
        let mut out = [Vector::zeros(); 8];

        for (i, c) in Self::CORNERS.iter().enumerate() {
            let wx = Self::eval_corner(xi.x, c[0]);
            let wy = Self::eval_corner(xi.y, c[1]);
            let wz = Self::eval_corner(xi.z, c[2]);

            out[i] = vector![
                inv_h * Self::eval_corner_derivative(c[0]) * wy * wz,
                inv_h * wx * Self::eval_corner_derivative(c[1]) * wz,
                inv_h * wx * wy * Self::eval_corner_derivative(c[2])
            ];
        }

        out
    }
}

#[cfg(test)]
mod test {
    use super::LinearKernel;
    use na::vector;

    #[test]
    fn partition_of_unity() {
        for xi in [
            vector![0.0, 0.0, 0.0],
            vector![0.5, 0.5, 0.5],
            vector![0.25, 0.75, 0.1],
            vector![1.0, 1.0, 1.0],
        ] {
            let w = LinearKernel::weights(&xi);
            let sum: f64 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1.0e-12);
            assert!(w.iter().all(|w| *w >= 0.0));
        }
    }

    #[test]
    fn gradients_sum_to_zero() {
        let xi = vector![0.3, 0.6, 0.9];
        let grads = LinearKernel::gradients(&xi, 0.5);
        let sum: na::Vector3<f64> = grads.iter().sum();
        assert!(sum.norm() < 1.0e-12);
    }
}
