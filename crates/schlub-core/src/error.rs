//! Registry errors.

use thiserror::Error;

use crate::descriptor::ServiceId;
use crate::payload::BoxError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No services for descriptor: {0}")]
    NotFound(String),

    #[error("Descriptor ambiguous: {descriptor} matched {matches} services")]
    Ambiguous { descriptor: String, matches: usize },

    #[error("Unknown service id: {0}")]
    UnknownId(ServiceId),

    #[error("Cyclic dependency: {chain}")]
    CyclicDependency { chain: String },

    #[error("Factory for {path} failed: {source}")]
    FactoryFailed {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Type mismatch for {context}: expected {expected}")]
    TypeMismatch { expected: String, context: String },

    #[error("Unexpected resolution shape: expected {expected}, got {actual}")]
    UnexpectedShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Missing argument at position {0}")]
    MissingArgument(usize),
}
