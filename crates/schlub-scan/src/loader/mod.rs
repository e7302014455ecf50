//! Module loaders.

mod manifest;

use std::path::Path;

use schlub_core::Registry;

use crate::error::ScanError;

pub use manifest::ManifestLoader;

/// Loads one module file, registering its services.
pub trait ModuleLoader: Send + Sync {
    /// Register the services defined by `source`, read from `path`.
    ///
    /// Returns the number of services registered.
    fn load(&self, path: &Path, source: &str, registry: &Registry) -> Result<usize, ScanError>;
}
