pub use self::explicit_solver::{ConcentratedForce, ExplicitSolver, Injection};
pub use self::step_hooks::StepHooks;
pub use crate::core::dynamics::solver::{
    ContainmentPolicy, LinearKernel, SolverParameters, StressUpdateScheme, VelocityUpdate,
};

mod contact;
mod explicit_solver;
mod forces;
mod grid_to_particle;
mod grid_update;
mod particle_to_grid;
mod step_hooks;
mod stress_update;
