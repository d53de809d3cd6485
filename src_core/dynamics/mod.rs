pub use self::nodal_dofs::NodalDofs;

mod nodal_dofs;
pub mod solver;
