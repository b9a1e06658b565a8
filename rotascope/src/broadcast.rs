//! Single-producer, many-consumer broadcaster (C7, §4.7).
//!
//! Each subscriber owns a single-slot overwrite mailbox: if `broadcast`
//! arrives before the previous value was drained, the previous value is
//! discarded. The subscriber set tolerates concurrent `subscribe`/
//! `unsubscribe` during a `broadcast` (§5 "add-on-accept, remove-on-
//! handler-exit").

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rotascope_common::model::RotationResult;

type Slot = Arc<Mutex<Option<RotationResult>>>;

/// A handle to one subscriber's overwrite mailbox.
#[derive(Clone)]
pub struct Mailbox {
    id: u64,
    slot: Slot,
}

impl Mailbox {
    /// Non-blocking single pop. Returns `None` if nothing is pending.
    pub fn try_recv(&self) -> Option<RotationResult> {
        self.slot.lock().take()
    }

    /// Peek without consuming (used by tests to assert overwrite semantics).
    #[cfg(test)]
    pub fn peek(&self) -> Option<RotationResult> {
        *self.slot.lock()
    }
}

struct Subscriber {
    id: u64,
    slot: Slot,
}

/// Owns the subscriber set and fans out [`RotationResult`]s.
pub struct Broadcaster {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self { subscribers: Mutex::new(Vec::new()), next_id: AtomicU64::new(0) }
    }

    /// Register a new mailbox with the subscriber set.
    pub fn subscribe(&self) -> Mailbox {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slot: Slot = Arc::new(Mutex::new(None));
        self.subscribers.lock().push(Subscriber { id, slot: slot.clone() });
        Mailbox { id, slot }
    }

    /// Remove a mailbox from the subscriber set. Idempotent: unsubscribing
    /// an already-removed (or unknown) mailbox is not an error.
    pub fn unsubscribe(&self, mailbox: &Mailbox) {
        self.subscribers.lock().retain(|s| s.id != mailbox.id);
    }

    /// Publish `result` to every current subscriber, overwriting any
    /// unconsumed pending value. Never blocks on a slow consumer.
    pub fn broadcast(&self, result: RotationResult) {
        let subscribers = self.subscribers.lock();
        for sub in subscribers.iter() {
            *sub.slot.lock() = Some(result);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
