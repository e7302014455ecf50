//! CLI definitions for schlub.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// schlub CLI.
#[derive(Parser)]
#[command(name = "schlub")]
#[command(about = "Path-addressed service registry with dependency resolution")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: <config dir>/schlub/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scan service modules and list what was registered
    List {
        /// Path pattern; `*` matches any single segment. Lists every
        /// occupied path when omitted.
        pattern: Option<String>,

        /// Only structured registrations with this name
        #[arg(long, conflicts_with_all = ["pattern", "kind"])]
        name: Option<String>,

        /// Only structured registrations of this type
        #[arg(long = "type", conflicts_with = "pattern")]
        kind: Option<String>,

        /// Additional scan roots
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Scan service modules and print the value(s) matching a pattern
    Get {
        /// Path pattern
        pattern: String,

        /// Additional scan roots
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Return every match as an array
        #[arg(long)]
        multiple: bool,

        /// Print null instead of failing when nothing matches
        #[arg(long)]
        allow_none: bool,
    },

    /// Validate the configuration
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_roots() {
        let cli = Cli::parse_from(["schlub", "list", "db/*", "-r", "/a", "--root", "/b"]);
        match cli.command {
            Commands::List { pattern, roots, format, .. } => {
                assert_eq!(pattern.as_deref(), Some("db/*"));
                assert_eq!(roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
                assert_eq!(format, "table");
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_list_by_type() {
        let cli = Cli::parse_from(["schlub", "list", "--type", "cache"]);
        assert!(matches!(
            cli.command,
            Commands::List { kind: Some(ref k), pattern: None, .. } if k == "cache"
        ));
    }

    #[test]
    fn test_name_conflicts_with_pattern() {
        let result = Cli::try_parse_from(["schlub", "list", "db/*", "--name", "primary"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_get_flags() {
        let cli = Cli::parse_from(["schlub", "--config", "/etc/schlub.toml", "get", "db/*", "--multiple", "--allow-none"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/schlub.toml")));
        match cli.command {
            Commands::Get { pattern, multiple, allow_none, roots } => {
                assert_eq!(pattern, "db/*");
                assert!(multiple);
                assert!(allow_none);
                assert!(roots.is_empty());
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from(["schlub", "check"]);
        assert!(matches!(cli.command, Commands::Check));
        assert!(cli.config.is_none());
    }
}
