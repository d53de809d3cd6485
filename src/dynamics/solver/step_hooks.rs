use crate::distributed::DomainDecomposition;

/// Output collaborators triggered on the configured cadence. Writer formats
/// (HDF5, VTK, particle dumps) live behind this seam.
pub trait StepHooks: Send + Sync {
    fn on_output(&mut self, step: u64, decomp: &DomainDecomposition);
}

impl StepHooks for () {
    fn on_output(&mut self, _: u64, _: &DomainDecomposition) {
        /* nothing */
    }
}
