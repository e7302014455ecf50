//! # Schlub Config
//!
//! Configuration management for schlub: where to scan for service modules and
//! how verbosely to log.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
