pub use self::mesh_node::{EnrichmentId, MaterialNodeDofs, MeshNode, NodeFlags};
pub use self::particle::{Particle, ShapeCache};
pub use self::particle_material::{MaterialHandle, MaterialSet, ParticleMaterial};
pub use self::particle_set::ParticleSet;

mod mesh_node;
pub mod models;
mod particle;
mod particle_material;
mod particle_set;
pub mod solver;
