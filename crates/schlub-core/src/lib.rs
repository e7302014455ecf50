//! # Schlub Core
//!
//! Path-addressed service registry with dependency resolution.
//!
//! ## Components
//!
//! - [`PathTrie`] - Ordered trie keyed by slash-delimited paths with `*` wildcards
//! - [`Registry`] - Registers factories and values, resolves their dependencies
//! - [`Descriptor`] - What to look up and how many results are acceptable
//! - [`RegistrationListener`] - Observer notified after every registration
//!
//! ## Resolution
//!
//! A lookup matches references in the trie, then instantiates each one:
//! values are returned as stored, factories are called with their resolved
//! dependencies. Singleton factories cache their first instance.

pub mod descriptor;
pub mod error;
pub mod events;
pub mod payload;
pub mod registry;
pub mod trie;

pub use descriptor::{Descriptor, RegistrationKey, ServiceId, Target};
pub use error::RegistryError;
pub use events::{RegistrationEvent, RegistrationListener, SubscriptionId};
pub use payload::{Arguments, BoxError, FactoryFn, Instance, Payload, Resolved};
pub use registry::{Registry, RegistrationOptions, ServiceReference, ServiceSummary};
pub use trie::{PathTrie, TrieNode, SEPARATOR, WILDCARD};
