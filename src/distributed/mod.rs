pub use self::domain::{DomainDecomposition, DomainError, Partition, SharedNode};
pub use self::halo::HaloError;

mod domain;
mod halo;
