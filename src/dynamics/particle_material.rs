use crate::dynamics::models::ConstitutiveModel;
use std::ops::Index;
use std::sync::Arc;

pub type MaterialHandle = usize;

/// Everything a particle needs to know about the material it is made of.
#[derive(Clone)]
pub struct ParticleMaterial {
    pub constitutive_model: Arc<dyn ConstitutiveModel>,
}

impl ParticleMaterial {
    pub fn new(constitutive_model: impl ConstitutiveModel + 'static) -> Self {
        Self {
            constitutive_model: Arc::new(constitutive_model),
        }
    }
}

#[derive(Clone, Default)]
pub struct MaterialSet {
    materials: Vec<ParticleMaterial>,
}

impl MaterialSet {
    pub fn new() -> Self {
        Self { materials: vec![] }
    }

    pub fn insert(&mut self, material: ParticleMaterial) -> MaterialHandle {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Index<MaterialHandle> for MaterialSet {
    type Output = ParticleMaterial;

    fn index(&self, handle: MaterialHandle) -> &Self::Output {
        &self.materials[handle]
    }
}
