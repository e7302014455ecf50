//! Service identifiers, registration keys and lookup descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trie::SEPARATOR;

/// Process-unique identifier assigned to every registration.
///
/// Identifiers are allocated from a monotonic counter and never reused, even
/// after the service they named has been forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(u64);

impl ServiceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The key a service is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationKey {
    /// A slash-delimited path such as `db/mysql`.
    Path(String),
    /// A name within a type group, stored at `type/name`.
    Named { name: String, kind: String },
}

impl RegistrationKey {
    pub fn named(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Canonical trie path for this key.
    pub fn path(&self) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Named { name, kind } => composite_path(name, kind),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Named { name, .. } => Some(name),
        }
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Named { kind, .. } => Some(kind),
        }
    }
}

impl From<&str> for RegistrationKey {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for RegistrationKey {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

fn composite_path(name: &str, kind: &str) -> String {
    format!("{kind}{SEPARATOR}{name}")
}

/// What a descriptor points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Exact reference lookup, bypassing the trie.
    Id(ServiceId),
    /// Path pattern; `*` segments match any child.
    Pattern(String),
}

/// Criteria describing what to retrieve, plus the result-shape flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub target: Target,
    /// Zero matches resolve to nothing instead of an error.
    pub allow_none: bool,
    /// Several matches resolve to all of them instead of an error.
    pub allow_multiple: bool,
    /// Bypass (and then replace) a cached singleton instance.
    pub new_instance: bool,
}

impl Descriptor {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::from_target(Target::Pattern(pattern.into()))
    }

    pub fn id(id: ServiceId) -> Self {
        Self::from_target(Target::Id(id))
    }

    /// Match a structured `{ name, type }` registration.
    pub fn named(name: &str, kind: &str) -> Self {
        Self::pattern(composite_path(name, kind))
    }

    fn from_target(target: Target) -> Self {
        Self {
            target,
            allow_none: false,
            allow_multiple: false,
            new_instance: false,
        }
    }

    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    pub fn allow_multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    pub fn new_instance(mut self) -> Self {
        self.new_instance = true;
        self
    }

    /// The same target with both none and multiple allowed.
    pub fn permissive(&self) -> Self {
        self.clone().allow_none().allow_multiple()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Id(id) => write!(f, "{id}")?,
            Target::Pattern(pattern) => write!(f, "\"{pattern}\"")?,
        }

        let flags: Vec<&str> = [
            (self.allow_none, "allow_none"),
            (self.allow_multiple, "allow_multiple"),
            (self.new_instance, "new_instance"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect();

        if !flags.is_empty() {
            write!(f, " [{}]", flags.join(", "))?;
        }
        Ok(())
    }
}

impl From<&str> for Descriptor {
    fn from(pattern: &str) -> Self {
        Self::pattern(pattern)
    }
}

impl From<String> for Descriptor {
    fn from(pattern: String) -> Self {
        Self::pattern(pattern)
    }
}

impl From<ServiceId> for Descriptor {
    fn from(id: ServiceId) -> Self {
        Self::id(id)
    }
}

impl From<&Descriptor> for Descriptor {
    fn from(descriptor: &Descriptor) -> Self {
        descriptor.clone()
    }
}
