use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique subscriber address. Assigned atomically, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(super) fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A request as it travels through the queue: payload plus return address
#[derive(Debug, Clone)]
pub struct Envelope<R> {
    pub origin: SubscriberId,
    /// Per-subscriber sequence number; a later send supersedes earlier ones
    pub sequence: u64,
    pub request: R,
}

/// Computes one response per request on a worker thread.
///
/// Domain failures belong in the response type. A panic is caught at the
/// worker boundary and the request is dropped without a response.
pub trait RequestHandler: Send + Sync + 'static {
    type Request: Send + 'static;
    type Response: Send + 'static;

    fn handle(&self, envelope: Envelope<Self::Request>, ctx: &RequestContext<'_>) -> Self::Response;
}

/// Registration state a handler can query while it works
pub(super) trait Liveness: Send + Sync {
    fn is_current(&self, origin: SubscriberId, sequence: u64) -> bool;
}

/// Per-request view of the service passed to `RequestHandler::handle`
pub struct RequestContext<'a> {
    pub(super) liveness: &'a dyn Liveness,
    pub(super) origin: SubscriberId,
    pub(super) sequence: u64,
    pub(super) pending: usize,
}

impl RequestContext<'_> {
    /// True while the origin subscriber is registered and has not sent or
    /// cancelled anything since this request. Takes the subscriber lock.
    pub fn is_current(&self) -> bool {
        self.liveness.is_current(self.origin, self.sequence)
    }

    /// Requests submitted to the service and not yet handled, this one included
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn origin(&self) -> SubscriberId {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_ids_unique_across_threads() {
        let seen = Arc::new(Mutex::new(HashSet::new()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seen = seen.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert!(seen.lock().unwrap().insert(SubscriberId::next()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(seen.lock().unwrap().len(), 800);
    }
}
