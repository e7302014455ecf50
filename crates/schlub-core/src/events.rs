//! Registration notifications.
//!
//! Listeners are called synchronously, in subscription order, after a
//! registration has been stored. No registry lock is held during delivery, so
//! a listener may itself query or mutate the registry. A panicking listener is
//! not caught.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::ServiceId;
use crate::payload::Payload;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A service was registered.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationEvent<'a> {
    pub id: ServiceId,
    pub path: &'a str,
    /// Set for structured `{ name, type }` registrations.
    pub name: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub payload: &'a Payload,
}

/// Observer of registrations.
pub trait RegistrationListener: Send + Sync {
    fn on_register(&self, event: &RegistrationEvent<'_>);
}

impl<F> RegistrationListener for F
where
    F: Fn(&RegistrationEvent<'_>) + Send + Sync,
{
    fn on_register(&self, event: &RegistrationEvent<'_>) {
        self(event)
    }
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    listener: Arc<dyn RegistrationListener>,
    once: bool,
}

/// Ordered listener list owned by a registry.
pub(crate) struct Listeners {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            subscriptions: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, listener: Arc<dyn RegistrationListener>, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().push(Subscription { id, listener, once });
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    pub(crate) fn notify(&self, event: &RegistrationEvent<'_>) {
        let snapshot = {
            let mut subscriptions = self.subscriptions.write();
            let snapshot = subscriptions.clone();
            subscriptions.retain(|s| !s.once);
            snapshot
        };

        for subscription in snapshot {
            subscription.listener.on_register(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
