pub extern crate nalgebra as na;

#[macro_use]
extern crate log;

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;

pub mod prelude {
    pub use crate::dynamics::solver::*;
    pub use crate::dynamics::*;
    pub use crate::math::*;
}

/// Compilation flags dependent aliases for mathematical types.
#[cfg(all(feature = "dim3", feature = "f64"))]
pub mod math {
    use na::{Matrix3, Point3, UnitVector3, Vector3, U3};

    /// The scalar type used throughout this crate.
    pub type Real = f64;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The dimension of the ambient space.
    pub type Dim = U3;

    /// The point type.
    pub type Point<N> = Point3<N>;

    /// The vector type.
    pub type Vector<N> = Vector3<N>;

    /// The unit vector type.
    pub type UnitVector<N> = UnitVector3<N>;

    /// The matrix type.
    pub type Matrix<N> = Matrix3<N>;

    pub type Kernel = crate::dynamics::solver::LinearKernel;
}

pub mod dynamics;
pub mod utils;
