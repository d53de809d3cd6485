pub use self::kernel::LinearKernel;
pub use self::solver_parameters::{
    ContainmentPolicy, SolverParameters, StressUpdateScheme, VelocityUpdate,
};

mod kernel;
mod solver_parameters;
