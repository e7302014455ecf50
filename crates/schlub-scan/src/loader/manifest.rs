//! TOML manifest modules.
//!
//! A manifest lists plain values to register:
//!
//! ```toml
//! [[service]]
//! path = "db/mysql"
//! value = { host = "localhost", port = 3306 }
//!
//! [[service]]
//! name = "primary"
//! type = "cache"
//! value = "redis://localhost"
//! ```
//!
//! Each value is registered as a `serde_json::Value`.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use schlub_core::{Payload, RegistrationKey, Registry};

use super::ModuleLoader;
use crate::error::ScanError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default, rename = "service")]
    services: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    path: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    value: serde_json::Value,
}

impl ManifestEntry {
    fn key(&self) -> Result<RegistrationKey, String> {
        match (&self.path, &self.name, &self.kind) {
            (Some(path), None, None) if path.is_empty() => Err("path is empty".to_string()),
            (Some(path), None, None) => Ok(RegistrationKey::from(path.as_str())),
            (None, Some(name), Some(kind)) => Ok(RegistrationKey::named(name.as_str(), kind.as_str())),
            (None, None, None) => Err("needs a path or a name and type".to_string()),
            (Some(_), _, _) => Err("path cannot be combined with name or type".to_string()),
            (None, _, _) => Err("name and type must be given together".to_string()),
        }
    }
}

/// Loads `[[service]]` manifests of plain values.
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn new() -> Self {
        Self
    }

    fn parse(path: &Path, source: &str) -> Result<Vec<(RegistrationKey, serde_json::Value)>, ScanError> {
        let manifest: Manifest = toml::from_str(source).map_err(|e| ScanError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        manifest
            .services
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let key = entry.key().map_err(|message| ScanError::InvalidManifest {
                    path: path.to_path_buf(),
                    message: format!("service {}: {}", index, message),
                })?;
                Ok((key, entry.value))
            })
            .collect()
    }
}

impl ModuleLoader for ManifestLoader {
    fn load(&self, path: &Path, source: &str, registry: &Registry) -> Result<usize, ScanError> {
        let entries = Self::parse(path, source)?;
        let count = entries.len();

        for (key, value) in entries {
            registry.register(key, Payload::value(value));
        }

        debug!(path = %path.display(), services = count, "Loaded manifest");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schlub_core::Descriptor;
    use serde_json::json;

    fn load(source: &str) -> (Registry, Result<usize, ScanError>) {
        let registry = Registry::new();
        let result = ManifestLoader::new().load(Path::new("services.toml"), source, &registry);
        (registry, result)
    }

    #[test]
    fn test_load_path_entries() {
        let (registry, result) = load(
            r#"
            [[service]]
            path = "db/mysql"
            value = { host = "localhost", port = 3306 }

            [[service]]
            path = "db/postgres"
            value = "postgres://localhost"
            "#,
        );

        assert_eq!(result.unwrap(), 2);
        let mysql = registry.get_as::<serde_json::Value>("db/mysql").unwrap();
        assert_eq!(*mysql, json!({ "host": "localhost", "port": 3306 }));
        assert_eq!(registry.paths(), vec!["db/mysql", "db/postgres"]);
    }

    #[test]
    fn test_load_named_entries() {
        let (registry, result) = load(
            r#"
            [[service]]
            name = "primary"
            type = "cache"
            value = "redis://localhost"
            "#,
        );

        assert_eq!(result.unwrap(), 1);
        let cache = registry
            .get_as::<serde_json::Value>(Descriptor::named("primary", "cache"))
            .unwrap();
        assert_eq!(*cache, json!("redis://localhost"));
        assert_eq!(registry.list_by_type("cache").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_value_is_null() {
        let (registry, result) = load("[[service]]\npath = \"flag\"");
        assert_eq!(result.unwrap(), 1);
        assert!(registry.get_as::<serde_json::Value>("flag").unwrap().is_null());
    }

    #[test]
    fn test_empty_manifest() {
        let (registry, result) = load("");
        assert_eq!(result.unwrap(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entry_without_key_is_invalid() {
        let (_, result) = load("[[service]]\nvalue = 1");
        assert!(matches!(
            result,
            Err(ScanError::InvalidManifest { message, .. }) if message.contains("service 0")
        ));
    }

    #[test]
    fn test_entry_with_path_and_name_is_invalid() {
        let (_, result) = load("[[service]]\npath = \"a\"\nname = \"b\"\ntype = \"c\"");
        assert!(matches!(result, Err(ScanError::InvalidManifest { .. })));
    }

    #[test]
    fn test_name_without_type_is_invalid() {
        let (_, result) = load("[[service]]\nname = \"primary\"");
        assert!(matches!(
            result,
            Err(ScanError::InvalidManifest { message, .. }) if message.contains("together")
        ));
    }

    #[test]
    fn test_invalid_entry_registers_nothing() {
        let (registry, result) = load(
            r#"
            [[service]]
            path = "ok"
            value = 1

            [[service]]
            path = ""
            "#,
        );

        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_field_is_invalid() {
        let (_, result) = load("[[service]]\npath = \"a\"\nfactory = \"x\"");
        assert!(matches!(result, Err(ScanError::InvalidManifest { .. })));
    }

    #[test]
    fn test_malformed_toml_is_invalid() {
        let (_, result) = load("[[service]\npath = ");
        assert!(matches!(result, Err(ScanError::InvalidManifest { path, .. }) if path == Path::new("services.toml")));
    }
}
