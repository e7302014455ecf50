//! # Schlub Scan
//!
//! Discovers service modules on disk and loads them into a registry.
//!
//! A [`Scanner`] walks its roots and hands every module file to a
//! [`ModuleLoader`], which registers services as a side effect. The bundled
//! [`ManifestLoader`] reads TOML manifests of plain values.

mod error;
mod loader;
mod scanner;

pub use error::ScanError;
pub use loader::{ManifestLoader, ModuleLoader};
pub use scanner::{ScanReport, Scanner};
