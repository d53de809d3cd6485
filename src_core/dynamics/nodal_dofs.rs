use crate::math::{Real, Vector, DIM};

/// Per-node accumulators for one material phase.
///
/// Every quantity is re-accumulated from scratch each step: nodes carry no
/// state across steps except topology. The slice-based setters validate the
/// incoming width against `DIM`; a mismatched assignment is rejected and the
/// node keeps its previous value.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct NodalDofs {
    pub mass: Real,
    momentum: Vector<Real>,
    velocity: Vector<Real>,
    acceleration: Vector<Real>,
    force_internal: Vector<Real>,
    force_external: Vector<Real>,
}

impl Default for NodalDofs {
    fn default() -> Self {
        Self {
            mass: 0.0,
            momentum: na::zero(),
            velocity: na::zero(),
            acceleration: na::zero(),
            force_internal: na::zero(),
            force_external: na::zero(),
        }
    }
}

macro_rules! vector_dof(
    ($get: ident, $get_mut: ident, $set: ident) => {
        #[inline]
        pub fn $get(&self) -> &Vector<Real> {
            &self.$get
        }

        #[inline]
        pub fn $get_mut(&mut self) -> &mut Vector<Real> {
            &mut self.$get
        }

        /// Checked assignment from an untyped slice.
        ///
        /// Returns `false` (and logs the mismatch) if `value` does not hold
        /// exactly `DIM` components; the stored value is left untouched.
        pub fn $set(&mut self, value: &[Real]) -> bool {
            if value.len() != DIM {
                error!(
                    "Rejecting nodal `{}` assignment: expected {} components, got {}.",
                    stringify!($get),
                    DIM,
                    value.len()
                );
                return false;
            }

            self.$get = Vector::from_column_slice(value);
            true
        }
    }
);

impl NodalDofs {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    vector_dof!(momentum, momentum_mut, set_momentum);
    vector_dof!(velocity, velocity_mut, set_velocity);
    vector_dof!(acceleration, acceleration_mut, set_acceleration);
    vector_dof!(force_internal, force_internal_mut, set_force_internal);
    vector_dof!(force_external, force_external_mut, set_force_external);

    /// Total nodal force, internal plus external.
    #[inline]
    pub fn force_total(&self) -> Vector<Real> {
        self.force_internal + self.force_external
    }
}

#[cfg(test)]
mod test {
    use super::NodalDofs;
    use crate::math::Vector;

    #[test]
    fn mismatched_assignment_is_rejected() {
        let mut dofs = NodalDofs::default();
        assert!(dofs.set_momentum(&[1.0, 2.0, 3.0]));
        assert_eq!(dofs.momentum(), &Vector::new(1.0, 2.0, 3.0));

        // Wrong widths must leave the previous value in place.
        assert!(!dofs.set_momentum(&[1.0, 2.0]));
        assert!(!dofs.set_momentum(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(dofs.momentum(), &Vector::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn reset_zeroes_every_accumulator() {
        let mut dofs = NodalDofs::default();
        dofs.mass = 2.5;
        dofs.set_velocity(&[0.1, 0.2, 0.3]);
        dofs.set_force_internal(&[5.0, 0.0, 0.0]);
        dofs.reset();
        assert_eq!(dofs, NodalDofs::default());
    }
}
