//! Directory scanner.
//!
//! Walks each root breadth-first, listing each directory in sorted file-name
//! order, and loads every file with the configured extension through a
//! [`ModuleLoader`]. A file is loaded at most
//! once per scanner, keyed by its canonical path.

use std::collections::{HashSet, VecDeque};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use schlub_config::ScanConfig;
use schlub_core::Registry;

use crate::error::ScanError;
use crate::loader::ModuleLoader;

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;

/// Counts from one [`Scanner::scan`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Directories listed, roots included.
    pub directories: usize,
    /// Module files loaded by this scan.
    pub loaded: usize,
    /// Module files already loaded by an earlier scan.
    pub skipped: usize,
    /// Services registered by the loaded modules.
    pub registered: usize,
}

/// Module file discovery.
pub struct Scanner {
    loader: Arc<dyn ModuleLoader>,
    extension: String,
    /// Subdirectory levels below a root to descend into.
    max_depth: Option<usize>,
    loaded: HashSet<PathBuf>,
}

impl Scanner {
    /// Create a scanner for `.toml` modules with no depth limit.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            extension: "toml".to_string(),
            max_depth: None,
            loaded: HashSet::new(),
        }
    }

    pub fn from_config(config: &ScanConfig, loader: Arc<dyn ModuleLoader>) -> Self {
        let scanner = Self::new(loader).with_extension(&config.extension);
        match config.max_depth {
            Some(depth) => scanner.with_max_depth(depth),
            None => scanner,
        }
    }

    /// Module file extension, with or without the leading dot.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Descend at most `depth` directory levels below each root.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Canonical paths of every module loaded so far.
    pub fn loaded_modules(&self) -> impl Iterator<Item = &Path> {
        self.loaded.iter().map(PathBuf::as_path)
    }

    /// Scan `roots` in order, loading new module files into `registry`.
    pub async fn scan<P: AsRef<Path>>(
        &mut self,
        roots: &[P],
        registry: &Registry,
    ) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport::default();

        for root in roots {
            self.scan_root(root.as_ref(), registry, &mut report).await?;
        }

        info!(
            directories = report.directories,
            loaded = report.loaded,
            skipped = report.skipped,
            registered = report.registered,
            "Scan complete"
        );
        Ok(report)
    }

    async fn scan_root(
        &mut self,
        root: &Path,
        registry: &Registry,
        report: &mut ScanReport,
    ) -> Result<(), ScanError> {
        let metadata = match tokio::fs::metadata(root).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScanError::RootNotFound(root.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        debug!(root = %root.display(), "Scanning");

        // Every file of a directory loads before any of its subdirectories.
        let mut queue = VecDeque::from([(root.to_path_buf(), 0usize)]);

        while let Some((dir, depth)) = queue.pop_front() {
            report.directories += 1;

            let listing = WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name();

            for entry in listing {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                let file_type = entry.file_type();
                if file_type.is_dir() {
                    if self.max_depth.is_none_or(|max| depth < max) {
                        queue.push_back((entry.into_path(), depth + 1));
                    }
                } else if file_type.is_file() && self.matches_extension(entry.path()) {
                    self.load_module(entry.path(), registry, report).await?;
                }
            }
        }

        Ok(())
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }

    async fn load_module(
        &mut self,
        path: &Path,
        registry: &Registry,
        report: &mut ScanReport,
    ) -> Result<(), ScanError> {
        let canonical = tokio::fs::canonicalize(path).await?;
        if self.loaded.contains(&canonical) {
            debug!(path = %path.display(), "Module already loaded");
            report.skipped += 1;
            return Ok(());
        }

        let source = tokio::fs::read_to_string(path).await?;
        let registered = self.loader.load(path, &source, registry)?;
        self.loaded.insert(canonical);

        debug!(path = %path.display(), registered, "Loaded module");
        report.loaded += 1;
        report.registered += registered;
        Ok(())
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("extension", &self.extension)
            .field("max_depth", &self.max_depth)
            .field("loaded", &self.loaded.len())
            .finish_non_exhaustive()
    }
}
