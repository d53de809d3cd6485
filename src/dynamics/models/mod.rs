pub use self::constitutive_model::ConstitutiveModel;
pub use self::elasticity_linear::LinearElasticity;

mod constitutive_model;
mod elasticity_linear;
