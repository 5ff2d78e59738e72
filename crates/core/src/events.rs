//! Event System
//!
//! Provides an ordered pub/sub event bus. Document surfaces use it for their
//! selection and text notifications, and the toolbar controller uses it to
//! tell the UI what to re-render.

use std::fmt::Debug;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::trace;

/// Subscriber handle for receiving events
///
/// Events arrive in the order they were emitted. Dropping the handle (or
/// calling [`EventSubscription::unsubscribe`]) de-registers it.
pub struct EventSubscription<E> {
    receiver: Receiver<E>,
}

impl<E> EventSubscription<E> {
    /// Try to receive an event (non-blocking)
    pub fn try_recv(&self) -> Result<E, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Iterate over the events already queued, without blocking
    pub fn pending(&self) -> impl Iterator<Item = E> + '_ {
        self.receiver.try_iter()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Stop receiving events
    pub fn unsubscribe(self) {}
}

/// Event bus for publish/subscribe pattern
pub struct EventBus<E> {
    subscribers: RwLock<Vec<Sender<E>>>,
}

impl<E: Clone + Debug> EventBus<E> {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> EventSubscription<E> {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        EventSubscription { receiver }
    }

    /// Emit an event to all subscribers, dropping the ones that went away
    pub fn emit(&self, event: E) -> usize {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());

        let delivered = subscribers.len();
        trace!("Event {:?} delivered to {} subscribers", event, delivered);
        delivered
    }

    /// Get the number of registered subscribers
    ///
    /// Subscribers dropped since the last emit are still counted.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<E: Clone + Debug> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
