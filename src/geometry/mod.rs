pub use self::background_grid::BackgroundGrid;
pub use self::discontinuity::{DiscontinuitySurface, LevelsetError, TriSurface};
pub use self::registry::{DiscontinuityDescriptor, DiscontinuityRegistry, RegistryError};
pub use self::surface_reader::{reader_for_format, AsciiSurfaceReader, ReaderError, SurfaceReader};

mod background_grid;
mod discontinuity;
mod registry;
mod surface_reader;
