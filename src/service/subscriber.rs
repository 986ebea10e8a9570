use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::error::ServiceError;

use super::handler::{Envelope, RequestHandler, SubscriberId};
use super::pool::{Service, ServiceInner};
use super::registry::Mailbox;

/// Caller-side handle bound to one service.
///
/// Sends requests tagged with its own id and collects the responses the
/// service routes back. Responses are only delivered while subscribed.
/// Dropping the handle unsubscribes it.
pub struct Subscriber<H: RequestHandler> {
    mailbox: Arc<Mailbox<H::Response>>,
    service: Arc<ServiceInner<H>>,
}

impl<H: RequestHandler> Subscriber<H> {
    /// A new, not yet subscribed handle with a fresh id
    pub fn new(service: &Service<H>) -> Self {
        Self {
            mailbox: Arc::new(Mailbox::new(SubscriberId::next())),
            service: service.inner().clone(),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.mailbox.id
    }

    /// Register with the service. Returns false if already registered.
    pub fn subscribe(&self) -> bool {
        let added = self.service.registry.add(self.mailbox.clone());
        if added {
            debug!(service = %self.service.name, subscriber = %self.id(), "Subscribed");
        }
        added
    }

    /// Deregister. Responses computed after this point are dropped.
    pub fn unsubscribe(&self) -> bool {
        let removed = self.service.registry.remove(self.id());
        if removed {
            debug!(service = %self.service.name, subscriber = %self.id(), "Unsubscribed");
        }
        removed
    }

    pub fn is_subscribed(&self) -> bool {
        self.service.registry.contains(self.id())
    }

    /// Submit `request` and wake a worker. Returns the sequence number the
    /// request was stamped with; it supersedes every earlier request from this
    /// subscriber.
    pub fn send_request(&self, request: H::Request) -> Result<u64, ServiceError> {
        let sequence = self.mailbox.latest_sequence.fetch_add(1, Ordering::AcqRel) + 1;
        self.service.submit(Envelope {
            origin: self.id(),
            sequence,
            request,
        })?;
        self.service.signal();
        Ok(sequence)
    }

    /// Sequence number of the most recent send or cancel
    pub fn latest_sequence(&self) -> u64 {
        self.mailbox.latest_sequence.load(Ordering::Acquire)
    }

    /// Mark every in-flight request from this subscriber as no longer wanted.
    /// Workers notice on their next liveness check.
    pub fn cancel(&self) {
        self.mailbox.latest_sequence.fetch_add(1, Ordering::AcqRel);
    }

    /// Next delivered response, if any. Never blocks.
    pub fn try_recv(&self) -> Option<H::Response> {
        self.mailbox.responses.pop()
    }

    /// Every response delivered so far. Never blocks.
    pub fn drain(&self) -> Vec<H::Response> {
        std::iter::from_fn(|| self.mailbox.responses.pop()).collect()
    }
}

impl<H: RequestHandler> Drop for Subscriber<H> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{RequestContext, ShutdownToken};

    /// Answers whether the request was still current when handled
    struct Probe;

    impl RequestHandler for Probe {
        type Request = ();
        type Response = (u64, bool);

        fn handle(&self, envelope: Envelope<()>, ctx: &RequestContext<'_>) -> (u64, bool) {
            (envelope.sequence, ctx.is_current())
        }
    }

    fn collect(subscriber: &Subscriber<Probe>, count: usize) -> Vec<(u64, bool)> {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let mut received = Vec::new();
        while received.len() < count && std::time::Instant::now() < deadline {
            received.extend(subscriber.drain());
            std::thread::yield_now();
        }
        received.sort();
        received
    }

    #[test]
    fn test_ids_are_unique() {
        let service = Service::new("ids", Probe, 0, ShutdownToken::new());
        let a = Subscriber::new(&service);
        let b = Subscriber::new(&service);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_subscribe_lifecycle() {
        let service = Service::new("lifecycle", Probe, 0, ShutdownToken::new());
        let subscriber = Subscriber::new(&service);
        assert!(!subscriber.is_subscribed());
        assert!(subscriber.subscribe());
        assert!(!subscriber.subscribe());
        assert_eq!(service.subscriber_count(), 1);

        assert!(subscriber.unsubscribe());
        assert!(!subscriber.unsubscribe());

        subscriber.subscribe();
        drop(subscriber);
        assert_eq!(service.subscriber_count(), 0);
    }

    #[test]
    fn test_resend_supersedes_earlier_request() {
        let service = Service::new("supersede", Probe, 0, ShutdownToken::new());
        let subscriber = Subscriber::new(&service);
        subscriber.subscribe();

        let first = subscriber.send_request(()).unwrap();
        let second = subscriber.send_request(()).unwrap();
        assert_eq!(second, first + 1);
        assert_eq!(subscriber.latest_sequence(), second);

        service.restart(1);
        let received = collect(&subscriber, 2);
        assert_eq!(received, vec![(first, false), (second, true)]);
    }

    #[test]
    fn test_cancel_invalidates_in_flight() {
        let service = Service::new("cancel", Probe, 0, ShutdownToken::new());
        let subscriber = Subscriber::new(&service);
        subscriber.subscribe();

        let sequence = subscriber.send_request(()).unwrap();
        subscriber.cancel();

        service.restart(1);
        assert_eq!(collect(&subscriber, 1), vec![(sequence, false)]);
    }

    #[test]
    fn test_send_after_shutdown_fails() {
        let token = ShutdownToken::new();
        let service = Service::new("closed", Probe, 1, token.clone());
        let subscriber = Subscriber::new(&service);
        subscriber.subscribe();

        token.trigger();
        assert!(matches!(
            subscriber.send_request(()),
            Err(ServiceError::ShutDown(_))
        ));
    }
}
