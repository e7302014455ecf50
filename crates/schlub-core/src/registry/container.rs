//! The dependency-resolving service registry.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::descriptor::{Descriptor, RegistrationKey, ServiceId, Target};
use crate::error::RegistryError;
use crate::events::{Listeners, RegistrationEvent, RegistrationListener, SubscriptionId};
use crate::payload::{Arguments, Instance, Payload, Resolved};
use crate::trie::PathTrie;

use super::reference::{RegistrationOptions, ServiceReference, ServiceSummary};

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;

type Reference = Arc<ServiceReference>;

#[derive(Default)]
struct RegistryState {
    trie: PathTrie<Reference>,
    by_id: HashMap<ServiceId, Reference>,
    by_name: HashMap<String, Vec<ServiceId>>,
    by_type: HashMap<String, Vec<ServiceId>>,
}

impl RegistryState {
    fn insert(&mut self, reference: Reference) {
        let id = reference.id();
        if let Some(name) = reference.name() {
            self.by_name.entry(name.to_string()).or_default().push(id);
        }
        if let Some(kind) = reference.kind() {
            self.by_type.entry(kind.to_string()).or_default().push(id);
        }
        self.trie.add(reference.path(), reference.clone());
        self.by_id.insert(id, reference);
    }

    /// Drop `reference` from the id map and the secondary indexes.
    fn unindex(&mut self, reference: &ServiceReference) -> bool {
        let id = reference.id();
        for (key, index) in [
            (reference.name(), &mut self.by_name),
            (reference.kind(), &mut self.by_type),
        ] {
            let Some(key) = key else { continue };
            if let Some(ids) = index.get_mut(key) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    index.remove(key);
                }
            }
        }
        self.by_id.remove(&id).is_some()
    }

    fn summaries(&self, ids: Option<&Vec<ServiceId>>) -> Vec<ServiceSummary> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
            .map(|reference| reference.summary())
            .collect()
    }
}

/// Service registry keyed by slash-delimited paths.
///
/// Services are registered as factories or plain values under a path and
/// retrieved by exact path, wildcard pattern or id. Factories may declare
/// dependencies, which are resolved by querying the same registry.
///
/// The registry is `Send + Sync`. Locks are never held while a factory runs
/// or while a dependency is being resolved, so factories and listeners may
/// call back into the registry.
pub struct Registry {
    state: RwLock<RegistryState>,
    next_id: AtomicU64,
    listeners: Listeners,
}

impl Registry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            next_id: AtomicU64::new(0),
            listeners: Listeners::new(),
        }
    }

    /// The process-wide default registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register a payload with no dependencies and default options.
    pub fn register(&self, key: impl Into<RegistrationKey>, payload: Payload) -> ServiceId {
        self.register_with(key, payload, Vec::<Descriptor>::new(), RegistrationOptions::default())
    }

    /// Register a payload with declared dependencies and options.
    ///
    /// Dependencies are resolved in order and passed to the factory ahead of
    /// any extra arguments.
    pub fn register_with(
        &self,
        key: impl Into<RegistrationKey>,
        payload: Payload,
        dependencies: impl IntoIterator<Item = impl Into<Descriptor>>,
        options: RegistrationOptions,
    ) -> ServiceId {
        let id = ServiceId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let dependencies = dependencies.into_iter().map(Into::into).collect();
        let reference = Arc::new(ServiceReference::new(id, key.into(), payload, dependencies, options));

        self.state.write().insert(reference.clone());

        debug!(
            id = %id,
            path = reference.path(),
            payload = reference.payload().kind(),
            dependencies = reference.dependencies().len(),
            singleton = options.singleton,
            "Registered service"
        );

        self.listeners.notify(&RegistrationEvent {
            id,
            path: reference.path(),
            name: reference.name(),
            kind: reference.kind(),
            payload: reference.payload(),
        });

        id
    }

    /// Resolve a descriptor to the references it names.
    ///
    /// Returns `Ok(None)` when nothing matched and `allow_none` is set.
    pub fn resolve_references(
        &self,
        descriptor: &Descriptor,
    ) -> Result<Option<Vec<Reference>>, RegistryError> {
        let matches: Vec<Reference> = {
            let state = self.state.read();
            match &descriptor.target {
                Target::Id(id) => state.by_id.get(id).cloned().into_iter().collect(),
                Target::Pattern(pattern) => state.trie.find(pattern).into_iter().cloned().collect(),
            }
        };

        if matches.is_empty() {
            if descriptor.allow_none {
                return Ok(None);
            }
            return Err(match descriptor.target {
                Target::Id(id) => RegistryError::UnknownId(id),
                Target::Pattern(_) => RegistryError::NotFound(descriptor.to_string()),
            });
        }

        if matches.len() > 1 && !descriptor.allow_multiple {
            return Err(RegistryError::Ambiguous {
                descriptor: descriptor.to_string(),
                matches: matches.len(),
            });
        }

        Ok(Some(matches))
    }

    /// Retrieve the service(s) named by `descriptor`.
    pub fn get(&self, descriptor: impl Into<Descriptor>) -> Result<Resolved, RegistryError> {
        self.get_with(descriptor, &[], &[])
    }

    /// Retrieve with caller-supplied dependencies and extra arguments.
    ///
    /// `supplied[i]`, when present, is used in place of resolving the i-th
    /// declared dependency. `extra` is appended after the dependencies.
    pub fn get_with(
        &self,
        descriptor: impl Into<Descriptor>,
        supplied: &[Option<Instance>],
        extra: &[Instance],
    ) -> Result<Resolved, RegistryError> {
        let descriptor = descriptor.into();
        let mut in_flight = Vec::new();
        self.resolve(&descriptor, supplied, extra, &mut in_flight)
    }

    /// Retrieve a single service of type `T`.
    pub fn get_as<T: Any + Send + Sync>(
        &self,
        descriptor: impl Into<Descriptor>,
    ) -> Result<Arc<T>, RegistryError> {
        self.get(descriptor)?.downcast()
    }

    /// Retrieve every service matching `pattern` as type `T`.
    pub fn get_all<T: Any + Send + Sync>(&self, pattern: &str) -> Result<Vec<Arc<T>>, RegistryError> {
        self.get(Descriptor::pattern(pattern).allow_none().allow_multiple())?
            .downcast_all()
    }

    fn resolve(
        &self,
        descriptor: &Descriptor,
        supplied: &[Option<Instance>],
        extra: &[Instance],
        in_flight: &mut Vec<Reference>,
    ) -> Result<Resolved, RegistryError> {
        let Some(references) = self.resolve_references(descriptor)? else {
            trace!(%descriptor, "Nothing matched, none allowed");
            return Ok(Resolved::None);
        };

        let mut instances = Vec::with_capacity(references.len());
        for reference in &references {
            instances.push(self.instantiate(reference, descriptor, supplied, extra, in_flight)?);
        }

        if descriptor.allow_multiple {
            Ok(Resolved::Many(instances))
        } else {
            Ok(instances.into_iter().next().map_or(Resolved::None, Resolved::One))
        }
    }

    fn instantiate(
        &self,
        reference: &Reference,
        descriptor: &Descriptor,
        supplied: &[Option<Instance>],
        extra: &[Instance],
        in_flight: &mut Vec<Reference>,
    ) -> Result<Instance, RegistryError> {
        let factory = match reference.payload() {
            Payload::Value(instance) => return Ok(instance.clone()),
            Payload::Factory(factory) => factory.clone(),
        };

        let singleton = reference.options().singleton;
        if singleton && !descriptor.new_instance {
            if let Some(instance) = reference.cached_instance() {
                trace!(path = reference.path(), "Using cached singleton");
                return Ok(instance);
            }
        }

        if in_flight.iter().any(|other| other.id() == reference.id()) {
            let mut chain: Vec<&str> = in_flight.iter().map(|r| r.path()).collect();
            chain.push(reference.path());
            return Err(RegistryError::CyclicDependency {
                chain: chain.join(" -> "),
            });
        }

        in_flight.push(reference.clone());
        let arguments = self.arguments(reference, supplied, extra, in_flight);
        in_flight.pop();
        let arguments = arguments?;

        debug!(
            path = reference.path(),
            arguments = arguments.len(),
            "Invoking factory"
        );

        let instance = factory(arguments).map_err(|source| RegistryError::FactoryFailed {
            path: reference.path().to_string(),
            source,
        })?;

        if singleton {
            Ok(reference.store_instance(instance, descriptor.new_instance))
        } else {
            Ok(instance)
        }
    }

    fn arguments(
        &self,
        reference: &ServiceReference,
        supplied: &[Option<Instance>],
        extra: &[Instance],
        in_flight: &mut Vec<Reference>,
    ) -> Result<Arguments, RegistryError> {
        let mut arguments = Vec::with_capacity(reference.dependencies().len() + extra.len());

        for (index, dependency) in reference.dependencies().iter().enumerate() {
            match supplied.get(index).and_then(Option::as_ref) {
                Some(instance) => arguments.push(Resolved::One(instance.clone())),
                None => arguments.push(self.resolve(dependency, &[], &[], in_flight)?),
            }
        }

        arguments.extend(extra.iter().cloned().map(Resolved::One));
        Ok(Arguments::new(arguments))
    }

    /// Remove every reference matching `descriptor`, unlinking its trie node.
    ///
    /// Never fails. Returns how many references were dropped from the id map.
    pub fn forget(&self, descriptor: impl Into<Descriptor>) -> usize {
        self.forget_matching(&descriptor.into(), None)
    }

    /// For every reference matching `descriptor`, drop it from the id map and
    /// take only the listed services out of its trie node.
    pub fn forget_values(&self, descriptor: impl Into<Descriptor>, values: &[ServiceId]) -> usize {
        self.forget_matching(&descriptor.into(), Some(values))
    }

    fn forget_matching(&self, descriptor: &Descriptor, values: Option<&[ServiceId]>) -> usize {
        let references = self
            .resolve_references(&descriptor.permissive())
            .ok()
            .flatten()
            .unwrap_or_default();

        let mut state = self.state.write();
        let mut forgotten = 0;

        for reference in &references {
            if state.unindex(reference) {
                forgotten += 1;
            }

            let detached = match values {
                Some(ids) => {
                    let filter: Vec<Reference> = state
                        .trie
                        .find(reference.path())
                        .into_iter()
                        .filter(|candidate| ids.contains(&candidate.id()))
                        .cloned()
                        .collect();
                    state.trie.remove(reference.path(), Some(filter.as_slice()))
                }
                None => state.trie.remove(reference.path(), None),
            };

            for other in &detached {
                if state.unindex(other) {
                    forgotten += 1;
                }
            }
        }

        debug!(%descriptor, forgotten, "Forgot services");
        forgotten
    }

    /// Whether `descriptor` matches at least one reference.
    pub fn contains(&self, descriptor: impl Into<Descriptor>) -> bool {
        matches!(
            self.resolve_references(&descriptor.into().permissive()),
            Ok(Some(_))
        )
    }

    /// Summaries of every reference matching `pattern`.
    pub fn list(&self, pattern: &str) -> Vec<ServiceSummary> {
        let state = self.state.read();
        state.trie.find(pattern).into_iter().map(|r| r.summary()).collect()
    }

    /// Summaries of structured registrations sharing `name`.
    pub fn list_by_name(&self, name: &str) -> Result<Vec<ServiceSummary>, RegistryError> {
        let state = self.state.read();
        let summaries = state.summaries(state.by_name.get(name));
        if summaries.is_empty() {
            return Err(RegistryError::NotFound(format!("name \"{name}\"")));
        }
        Ok(summaries)
    }

    /// Summaries of structured registrations sharing `kind`.
    pub fn list_by_type(&self, kind: &str) -> Result<Vec<ServiceSummary>, RegistryError> {
        let state = self.state.read();
        let summaries = state.summaries(state.by_type.get(kind));
        if summaries.is_empty() {
            return Err(RegistryError::NotFound(format!("type \"{kind}\"")));
        }
        Ok(summaries)
    }

    /// Every occupied path.
    pub fn paths(&self) -> Vec<String> {
        self.state.read().trie.paths()
    }

    /// Number of references reachable by id.
    pub fn len(&self) -> usize {
        self.state.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration. Ids keep counting up; listeners stay.
    pub fn clear(&self) {
        *self.state.write() = RegistryState::default();
        debug!("Cleared registry");
    }

    /// Call `listener` on every subsequent registration.
    pub fn subscribe(&self, listener: impl RegistrationListener + 'static) -> SubscriptionId {
        self.listeners.subscribe(Arc::new(listener), false)
    }

    /// Call `listener` on the next registration only.
    pub fn subscribe_once(&self, listener: impl RegistrationListener + 'static) -> SubscriptionId {
        self.listeners.subscribe(Arc::new(listener), true)
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("services", &self.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}
