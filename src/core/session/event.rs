use crate::core::session::state::SessionStatus;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

/// Subscription identifier
pub type SubscriptionId = u64;

/// Event delivered to session subscribers, in transport order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InboundEvent {
    /// Lifecycle transition
    Lifecycle {
        state: SessionStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Application payload, opaque to the session
    Data { payload: String },
    /// Recoverable failure surfaced for observability
    Error { detail: String },
}

struct RegistryInner {
    next_id: SubscriptionId,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<InboundEvent>>,
}

/// Fan-out registry for session events
///
/// Each subscriber owns an independent channel, so a dropped or lagging
/// subscriber never blocks delivery to the others.
#[derive(Clone)]
pub struct SubscriberRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                subscribers: HashMap::new(),
            })),
        }
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Subscription {
        let (sender, events) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, sender);

        Subscription {
            id,
            events,
            registry: self.clone(),
        }
    }

    /// Remove a subscriber; a no-op for unknown ids
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.lock().subscribers.remove(&id);
    }

    /// Deliver an event to every live subscriber, pruning dropped ones
    pub fn broadcast(&self, event: &InboundEvent) {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|id, sender| match sender.send(event.clone()) {
                Ok(()) => true,
                Err(_) => {
                    trace!("Pruning dropped subscriber {}", id);
                    false
                }
            });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a live subscription
///
/// Receives events in delivery order; unsubscribes when dropped.
pub struct Subscription {
    id: SubscriptionId,
    events: mpsc::UnboundedReceiver<InboundEvent>,
    registry: SubscriberRegistry,
}

impl Subscription {
    /// Receive the next event; `None` once the session is gone and the
    /// backlog is drained
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        self.events.recv().await
    }

    /// Non-blocking receive of an already-delivered event
    pub fn try_recv(&mut self) -> Option<InboundEvent> {
        self.events.try_recv().ok()
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Explicitly deregister; equivalent to dropping the handle
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(self.id);
    }
}
