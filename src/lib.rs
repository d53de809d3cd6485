pub extern crate parry3d_f64 as parry;

pub extern crate cleave3d_core;

pub extern crate nalgebra as na;

#[macro_use]
extern crate log;

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;

pub use cleave3d_core as core;

pub mod prelude {
    pub use crate::distributed::*;
    pub use crate::dynamics::models::*;
    pub use crate::dynamics::solver::*;
    pub use crate::dynamics::*;
    pub use crate::geometry::*;
    pub use crate::math::*;
    pub use crate::pipelines::*;
}

pub mod math {
    pub use crate::core::math::*;
    pub type Kernel = crate::core::dynamics::solver::LinearKernel;
}

pub use crate::core::utils;

pub mod distributed;
pub mod dynamics;
pub mod geometry;
pub mod pipelines;
