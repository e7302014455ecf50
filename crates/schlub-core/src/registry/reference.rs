//! Registered service records.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, RegistrationKey, ServiceId};
use crate::payload::{Instance, Payload};

/// Per-registration options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOptions {
    /// Cache the first produced instance and hand it out on later lookups.
    #[serde(default)]
    pub singleton: bool,
}

impl RegistrationOptions {
    pub fn singleton() -> Self {
        Self { singleton: true }
    }
}

/// A payload bound to a path, with its dependencies and options.
///
/// Two references are equal when they share an id.
pub struct ServiceReference {
    id: ServiceId,
    path: String,
    name: Option<String>,
    kind: Option<String>,
    payload: Payload,
    dependencies: Vec<Descriptor>,
    options: RegistrationOptions,
    cached: Mutex<Option<Instance>>,
}

impl ServiceReference {
    pub(crate) fn new(
        id: ServiceId,
        key: RegistrationKey,
        payload: Payload,
        dependencies: Vec<Descriptor>,
        options: RegistrationOptions,
    ) -> Self {
        let path = key.path();
        let (name, kind) = match key {
            RegistrationKey::Path(_) => (None, None),
            RegistrationKey::Named { name, kind } => (Some(name), Some(kind)),
        };

        Self {
            id,
            path,
            name,
            kind,
            payload,
            dependencies,
            options,
            cached: Mutex::new(None),
        }
    }

    pub fn id(&self) -> ServiceId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn dependencies(&self) -> &[Descriptor] {
        &self.dependencies
    }

    pub fn options(&self) -> RegistrationOptions {
        self.options
    }

    /// Whether a singleton instance has been produced.
    pub fn is_cached(&self) -> bool {
        self.cached.lock().is_some()
    }

    pub(crate) fn cached_instance(&self) -> Option<Instance> {
        self.cached.lock().clone()
    }

    /// Store a produced singleton instance and return the one to hand out.
    ///
    /// Without `replace`, an instance stored concurrently by another caller
    /// wins over `instance`.
    pub(crate) fn store_instance(&self, instance: Instance, replace: bool) -> Instance {
        let mut cached = self.cached.lock();
        if !replace {
            if let Some(existing) = cached.as_ref() {
                return existing.clone();
            }
        }
        *cached = Some(instance.clone());
        instance
    }

    pub fn summary(&self) -> ServiceSummary {
        ServiceSummary {
            id: self.id,
            path: self.path.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            payload: self.payload.kind(),
            dependencies: self.dependencies.iter().map(ToString::to_string).collect(),
            singleton: self.options.singleton,
            cached: self.is_cached(),
        }
    }
}

impl PartialEq for ServiceReference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceReference {}

impl fmt::Debug for ServiceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceReference")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("payload", &self.payload)
            .field("dependencies", &self.dependencies)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Serializable description of a reference, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub id: ServiceId,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub payload: &'static str,
    pub dependencies: Vec<String>,
    pub singleton: bool,
    pub cached: bool,
}
