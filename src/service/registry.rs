use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::handler::{Liveness, SubscriberId};

/// Subscriber-side state the service writes into
pub(super) struct Mailbox<Resp> {
    pub(super) id: SubscriberId,
    pub(super) latest_sequence: AtomicU64,
    pub(super) responses: SegQueue<Resp>,
}

impl<Resp> Mailbox<Resp> {
    pub(super) fn new(id: SubscriberId) -> Self {
        Self {
            id,
            latest_sequence: AtomicU64::new(0),
            responses: SegQueue::new(),
        }
    }
}

/// Registered subscribers behind one lock. Iterated, not indexed.
pub(super) struct Registry<Resp> {
    subscribers: Mutex<Vec<Arc<Mailbox<Resp>>>>,
}

impl<Resp> Registry<Resp> {
    pub(super) fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Mailbox<Resp>>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false if a mailbox with the same id is already registered.
    pub(super) fn add(&self, mailbox: Arc<Mailbox<Resp>>) -> bool {
        let mut subscribers = self.lock();
        if subscribers.iter().any(|m| m.id == mailbox.id) {
            return false;
        }
        subscribers.push(mailbox);
        true
    }

    pub(super) fn remove(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|m| m.id != id);
        subscribers.len() != before
    }

    pub(super) fn contains(&self, id: SubscriberId) -> bool {
        self.lock().iter().any(|m| m.id == id)
    }

    pub(super) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Deliver to the subscriber registered under `origin`. Returns false
    /// when nobody with that id is registered and the response is dropped.
    pub(super) fn broadcast(&self, origin: SubscriberId, response: Resp) -> bool {
        let subscribers = self.lock();
        match subscribers.iter().find(|m| m.id == origin) {
            Some(mailbox) => {
                mailbox.responses.push(response);
                true
            }
            None => {
                debug!(%origin, "No registered subscriber, dropping response");
                false
            }
        }
    }
}

impl<Resp: Send> Liveness for Registry<Resp> {
    fn is_current(&self, origin: SubscriberId, sequence: u64) -> bool {
        self.lock()
            .iter()
            .any(|m| m.id == origin && m.latest_sequence.load(Ordering::Acquire) == sequence)
    }
}
