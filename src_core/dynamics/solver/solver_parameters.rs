use crate::math::{Real, Vector};
use na::vector;

/// Ordering of the stress computation relative to force mapping and momentum
/// integration within one step. Exactly one of the two orderings fires per
/// step.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StressUpdateScheme {
    /// USF: stresses are updated before forces are mapped and integrated.
    UpdateStressFirst,
    /// USL: stresses are updated after the nodal solution of the step.
    UpdateStressLast,
}

/// How particle velocities are rebuilt from the nodal solution.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VelocityUpdate {
    /// Particle velocity is fully interpolated from nodal velocities.
    Pic,
    /// FLIP-style blend: `blend` weighs the incremental (FLIP) part,
    /// `1 - blend` the interpolated (PIC) part.
    Flip { blend: Real },
}

/// What to do with a particle that can no longer be located in the mesh.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainmentPolicy {
    /// A particle outside the mesh domain aborts the run.
    Strict,
    /// Unlocatable particles are removed and the run continues.
    RemoveLost,
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverParameters {
    pub dt: Real,
    pub gravity: Vector<Real>,
    pub stress_update: StressUpdateScheme,
    pub velocity_update: VelocityUpdate,
    pub containment: ContainmentPolicy,
    /// Nodal pressure averaging fed back to particles before the stress
    /// update.
    pub pressure_smoothing: bool,
    /// Multi-material (interface) node enrichment.
    pub interface_mode: bool,
    /// Discontinuity (XMPM) node enrichment from level-set sides.
    pub discontinuity_mode: bool,
    /// Trigger output hooks every `output_frequency` steps. Zero disables.
    pub output_frequency: u64,
    /// Rebalance the domain decomposition every `repartition_frequency`
    /// steps (never at step 0). Zero disables.
    pub repartition_frequency: u64,
    /// Domain-gradient magnitudes below this are not normalized into contact
    /// normals.
    pub contact_epsilon: Real,
    /// A separation beyond this (along the contact normal) suppresses
    /// inter-material momentum exchange.
    pub separation_cutoff: Real,
}

impl Default for SolverParameters {
    fn default() -> Self {
        SolverParameters {
            dt: 1.0e-3,
            gravity: vector![0.0, 0.0, -9.81],
            stress_update: StressUpdateScheme::UpdateStressLast,
            velocity_update: VelocityUpdate::Flip { blend: 1.0 },
            containment: ContainmentPolicy::RemoveLost,
            pressure_smoothing: false,
            interface_mode: false,
            discontinuity_mode: false,
            output_frequency: 0,
            repartition_frequency: 0,
            contact_epsilon: 1.0e-9,
            separation_cutoff: 1.0e-6,
        }
    }
}
