//! Service subcommand handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use schlub_config::{Config, ConfigLoader, ConfigValidator};
use schlub_core::{Descriptor, Registry, Resolved, ServiceSummary};
use schlub_scan::{ManifestLoader, ScanReport, Scanner};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Scan the configured roots plus `extra_roots` into `registry`.
async fn scan(
    config: &Config,
    extra_roots: &[PathBuf],
    registry: &Registry,
) -> Result<ScanReport, Box<dyn std::error::Error>> {
    let mut roots = config.scan.root_paths();
    roots.extend(extra_roots.iter().cloned());
    if roots.is_empty() {
        warn!("No scan roots; pass --root or set scan.roots in the config");
    }

    let mut scanner = Scanner::from_config(&config.scan, Arc::new(ManifestLoader::new()));
    Ok(scanner.scan(&roots, registry).await?)
}

/// List registered services.
pub(crate) async fn list(
    config: &Config,
    pattern: Option<String>,
    name: Option<String>,
    kind: Option<String>,
    roots: &[PathBuf],
    format: &str,
) -> CmdResult {
    let registry = Registry::global();
    scan(config, roots, registry).await?;

    let summaries = match (pattern, name, kind) {
        (Some(pattern), _, _) => registry.list(&pattern),
        (None, Some(name), _) => registry.list_by_name(&name)?,
        (None, None, Some(kind)) => registry.list_by_type(&kind)?,
        (None, None, None) => {
            let mut all = Vec::new();
            for path in registry.paths() {
                all.extend(registry.list(&path));
            }
            all
        }
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summaries)?),
        _ => print_table(&summaries),
    }
    Ok(())
}

fn print_table(summaries: &[ServiceSummary]) {
    if summaries.is_empty() {
        println!("No services found.");
        return;
    }

    println!("{:<6} {:<40} {:<8} {}", "ID", "PATH", "PAYLOAD", "DEPENDENCIES");
    println!("{}", "-".repeat(70));
    for summary in summaries {
        println!(
            "{:<6} {:<40} {:<8} {}",
            summary.id.to_string(),
            summary.path,
            summary.payload,
            summary.dependencies.join(", ")
        );
    }
    println!();
    println!("Total: {} services", summaries.len());
}

/// Resolve a pattern and print the resulting values as JSON.
pub(crate) async fn get(
    config: &Config,
    pattern: String,
    roots: &[PathBuf],
    multiple: bool,
    allow_none: bool,
) -> CmdResult {
    let registry = Registry::global();
    scan(config, roots, registry).await?;

    let mut descriptor = Descriptor::pattern(pattern);
    if multiple {
        descriptor = descriptor.allow_multiple();
    }
    if allow_none {
        descriptor = descriptor.allow_none();
    }

    let resolved = registry.get(&descriptor)?;
    let values = resolved.downcast_all::<serde_json::Value>()?;
    let output = match resolved {
        Resolved::Many(_) => serde_json::Value::Array(values.iter().map(|v| (**v).clone()).collect()),
        Resolved::One(_) | Resolved::None => values
            .first()
            .map(|v| (**v).clone())
            .unwrap_or(serde_json::Value::Null),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Validate the configuration and report problems.
pub(crate) fn check(config: &Config) -> CmdResult {
    if let Some(path) = ConfigLoader::default_path() {
        info!("Default config location: {}", path.display());
    }

    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    match result.into_error() {
        Some(err) => Err(err.into()),
        None => {
            println!("Configuration OK");
            Ok(())
        }
    }
}
