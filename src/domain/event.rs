//! Per-instance observer lists
//!
//! Every command owns its own [`EventSource`] for readiness, completion and
//! progress, so notifying one command's observers never re-queries unrelated
//! commands.

use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering}
    }
};

/// Handler invoked with every published event
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Token returned by [`EventSource::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A list of subscribers notified synchronously, in subscription order
pub struct EventSource<E> {
    next_id:  AtomicU64,
    handlers: RwLock<Vec<(SubscriptionId, Handler<E>)>>
}

impl<E> EventSource<E> {
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(0), handlers: RwLock::new(Vec::new()) }
    }

    /// Register a handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().unwrap_or_else(PoisonError::into_inner).push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Notify every handler.
    ///
    /// Handlers run outside the lock, so they may subscribe, unsubscribe or
    /// publish again.
    pub fn publish(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<E> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource").field("subscribers", &self.subscriber_count()).finish()
    }
}
