use crate::geometry::discontinuity::LevelsetError;
use crate::geometry::{reader_for_format, DiscontinuitySurface, ReaderError, TriSurface};
use crate::math::Real;
use std::path::PathBuf;
use thiserror::Error;

/// One entry of the (optional) discontinuity configuration section.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DiscontinuityDescriptor {
    /// Caller-assigned unique id.
    pub id: u32,
    /// Declared surface type; `"tri3d"` is the explicit triangulated surface.
    pub surface_type: String,
    /// Declared input format, resolved through [`reader_for_format`].
    pub io_format: String,
    pub file: PathBuf,
    pub friction: Real,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate discontinuity id {0}")]
    DuplicateId(u32),
    #[error("unknown discontinuity surface type `{0}`")]
    UnknownSurfaceType(String),
    #[error("discontinuity {0}: surface geometry is invalid")]
    InvalidGeometry(u32),
    #[error("discontinuity {0}: {1}")]
    Reader(u32, #[source] ReaderError),
    #[error("discontinuity {0}: level-set computation failed: {1}")]
    Levelset(u32, #[source] LevelsetError),
}

/// Keyed collection of discontinuity surfaces. Iteration order is insertion
/// order, which also defines the per-particle level-set column of each
/// surface.
pub struct DiscontinuityRegistry {
    surfaces: Vec<(u32, Box<dyn DiscontinuitySurface>)>,
}

impl DiscontinuityRegistry {
    pub fn new() -> Self {
        Self { surfaces: vec![] }
    }

    /// Builds the registry from the configuration section. An absent section
    /// simply disables discontinuity handling; any malformed entry aborts the
    /// whole build.
    pub fn from_config(
        descriptors: Option<&[DiscontinuityDescriptor]>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        let descriptors = match descriptors {
            Some(descs) => descs,
            None => {
                info!("No discontinuity section found; discontinuity handling is disabled.");
                return Ok(registry);
            }
        };

        for desc in descriptors {
            let reader = reader_for_format(&desc.io_format)
                .map_err(|e| RegistryError::Reader(desc.id, e))?;
            let nodes = reader
                .read_mesh_nodes(&desc.file)
                .map_err(|e| RegistryError::Reader(desc.id, e))?;
            let cells = reader
                .read_mesh_cells(&desc.file)
                .map_err(|e| RegistryError::Reader(desc.id, e))?;

            let mut surface: Box<dyn DiscontinuitySurface> = match desc.surface_type.as_str() {
                "tri3d" => Box::new(TriSurface::new()),
                other => return Err(RegistryError::UnknownSurfaceType(other.to_string())),
            };

            if !surface.initialize(&nodes, &cells) {
                return Err(RegistryError::InvalidGeometry(desc.id));
            }
            surface.set_friction(desc.friction);

            registry.try_insert(desc.id, surface)?;
            info!(
                "Registered discontinuity {} ({} nodes, {} facets).",
                desc.id,
                nodes.len(),
                cells.len()
            );
        }

        Ok(registry)
    }

    /// Inserts a surface under a caller-assigned id. Duplicates are reported
    /// as data, not as a panic.
    pub fn try_insert(
        &mut self,
        id: u32,
        surface: Box<dyn DiscontinuitySurface>,
    ) -> Result<(), RegistryError> {
        if self.surfaces.iter().any(|(existing, _)| *existing == id) {
            return Err(RegistryError::DuplicateId(id));
        }

        self.surfaces.push((id, surface));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &dyn DiscontinuitySurface)> {
        self.surfaces.iter().map(|(id, s)| (*id, &**s))
    }

    /// The surface backing level-set column `column`.
    pub fn surface(&self, column: usize) -> Option<&dyn DiscontinuitySurface> {
        self.surfaces.get(column).map(|(_, s)| &**s)
    }

    /// Friction coefficient of the surface backing `column` (zero when the
    /// column is unknown, e.g. plain interface mode).
    pub fn friction(&self, column: usize) -> Real {
        self.surface(column).map(|s| s.friction()).unwrap_or(0.0)
    }
}

impl Default for DiscontinuityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::{DiscontinuityRegistry, RegistryError};
    use crate::geometry::TriSurface;
    use na::point;

    fn plane(z: f64) -> Box<TriSurface> {
        let nodes = [
            point![0.0, 0.0, z],
            point![1.0, 0.0, z],
            point![1.0, 1.0, z],
        ];
        Box::new(TriSurface::from_geometry(&nodes, &[[0, 1, 2]], 0.0).unwrap())
    }

    #[test]
    fn duplicate_ids_fail_distinct_ids_accumulate() {
        let mut registry = DiscontinuityRegistry::new();
        registry.try_insert(3, plane(0.0)).unwrap();
        registry.try_insert(7, plane(1.0)).unwrap();

        assert!(matches!(
            registry.try_insert(3, plane(2.0)),
            Err(RegistryError::DuplicateId(3))
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn absent_config_section_disables_the_feature() {
        let registry = DiscontinuityRegistry::from_config(None).unwrap();
        assert!(registry.is_empty());
    }
}
