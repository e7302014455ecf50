//! Scan errors.

use std::path::PathBuf;

use schlub_core::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Scan root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid manifest {}: {message}", .path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}
