use crossbeam::channel::{select, unbounded, Receiver, Sender, TryRecvError};
use crossbeam::queue::SegQueue;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::error::ServiceError;

use super::handler::{Envelope, RequestContext, RequestHandler, SubscriberId};
use super::registry::Registry;
use super::shutdown::ShutdownToken;

/// State shared by the service handle, its workers and its subscribers
pub(super) struct ServiceInner<H: RequestHandler> {
    pub(super) name: String,
    handler: H,
    queue: SegQueue<Envelope<H::Request>>,
    work_tx: Sender<()>,
    work_rx: Receiver<()>,
    pub(super) registry: Registry<H::Response>,
    shutdown: ShutdownToken,
    pending: AtomicUsize,
}

impl<H: RequestHandler> ServiceInner<H> {
    pub(super) fn submit(&self, envelope: Envelope<H::Request>) -> Result<(), ServiceError> {
        if self.shutdown.is_triggered() {
            return Err(ServiceError::ShutDown(self.name.clone()));
        }
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.queue.push(envelope);
        Ok(())
    }

    pub(super) fn signal(&self) {
        // the receiver lives as long as `self`, so this cannot fail
        let _ = self.work_tx.send(());
    }

    /// Handle queued requests until the queue is empty or the worker is told
    /// to stop.
    fn drain(&self, stop: &Receiver<()>) {
        while let Some(envelope) = self.queue.pop() {
            let origin = envelope.origin;
            let ctx = RequestContext {
                liveness: &self.registry,
                origin,
                sequence: envelope.sequence,
                pending: self.pending.load(Ordering::SeqCst),
            };

            let result = catch_unwind(AssertUnwindSafe(|| self.handler.handle(envelope, &ctx)));
            self.pending.fetch_sub(1, Ordering::SeqCst);

            match result {
                Ok(response) => {
                    if self.registry.broadcast(origin, response) {
                        debug!(service = %self.name, %origin, "Delivered response");
                    }
                }
                Err(_) => {
                    error!(service = %self.name, %origin, "Request handler panicked, request dropped");
                }
            }

            thread::yield_now();

            if self.shutdown.is_triggered() || is_stopped(stop) {
                break;
            }
        }
    }
}

fn is_stopped(stop: &Receiver<()>) -> bool {
    matches!(stop.try_recv(), Err(TryRecvError::Disconnected))
}

fn run_worker<H: RequestHandler>(inner: Arc<ServiceInner<H>>, stop: Receiver<()>) {
    let shutdown = inner.shutdown.listener();
    debug!(service = %inner.name, "Worker started");

    loop {
        let woken_for_work = select! {
            recv(inner.work_rx) -> _ => {
                inner.drain(&stop);
                true
            }
            recv(stop) -> _ => false,
            recv(shutdown) -> _ => false,
        };

        if !woken_for_work || inner.shutdown.is_triggered() || is_stopped(&stop) {
            break;
        }
    }

    debug!(service = %inner.name, "Worker exiting");
}

/// The current worker generation
struct WorkerPool {
    // dropping the sender tells this generation to exit
    stop: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn empty() -> Self {
        Self {
            stop: None,
            handles: Vec::new(),
        }
    }

    fn stop_and_join(&mut self) {
        self.stop.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("Worker thread panicked outside a request");
            }
        }
    }
}

/// Multi-threaded request/response service.
///
/// Requests from any thread go into one lock-free queue; a fixed pool of
/// worker threads handles them and routes each response to the subscriber
/// that sent the request.
pub struct Service<H: RequestHandler> {
    inner: Arc<ServiceInner<H>>,
    pool: Mutex<WorkerPool>,
}

impl<H: RequestHandler> Service<H> {
    /// Create the service and start `threads` workers. Workers that fail to
    /// spawn are logged and the service runs with fewer.
    pub fn new(name: impl Into<String>, handler: H, threads: usize, shutdown: ShutdownToken) -> Self {
        let (work_tx, work_rx) = unbounded();
        let inner = Arc::new(ServiceInner {
            name: name.into(),
            handler,
            queue: SegQueue::new(),
            work_tx,
            work_rx,
            registry: Registry::new(),
            shutdown,
            pending: AtomicUsize::new(0),
        });

        let service = Self {
            inner,
            pool: Mutex::new(WorkerPool::empty()),
        };
        service.restart(threads);
        service
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn handler(&self) -> &H {
        &self.inner.handler
    }

    pub(super) fn inner(&self) -> &Arc<ServiceInner<H>> {
        &self.inner
    }

    /// Enqueue a request addressed back to `origin`. Never blocks. Fails only
    /// once shutdown has been triggered.
    pub fn submit(&self, request: H::Request, origin: SubscriberId, sequence: u64) -> Result<(), ServiceError> {
        self.inner.submit(Envelope {
            origin,
            sequence,
            request,
        })
    }

    /// Wake an idle worker
    pub fn signal(&self) {
        self.inner.signal();
    }

    /// Requests submitted and not yet handled
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn active_workers(&self) -> usize {
        self.lock_pool().handles.len()
    }

    /// Stop and join every worker, then start `threads` fresh ones.
    /// Queued requests survive a restart.
    pub fn restart(&self, threads: usize) {
        let mut pool = self.lock_pool();
        pool.stop_and_join();

        if self.inner.shutdown.is_triggered() {
            warn!(service = %self.inner.name, "Restart after shutdown, no workers started");
            return;
        }

        let (stop_tx, stop_rx) = unbounded::<()>();
        for index in 0..threads {
            let inner = self.inner.clone();
            let stop = stop_rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-worker-{}", self.inner.name, index))
                .spawn(move || run_worker(inner, stop));

            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(e) => {
                    error!(
                        service = %self.inner.name,
                        "{}",
                        ServiceError::Spawn(e)
                    );
                }
            }
        }
        pool.stop = Some(stop_tx);

        if pool.handles.len() < threads {
            warn!(
                service = %self.inner.name,
                "Running with {} of {} workers",
                pool.handles.len(),
                threads
            );
        } else {
            info!(service = %self.inner.name, "Started {} workers", threads);
        }

        // pick up anything queued while no workers were running
        if !self.inner.queue.is_empty() {
            self.inner.signal();
        }
    }

    /// Trigger the shared shutdown token and join this service's workers.
    /// Every other service holding the same token stops too.
    pub fn shutdown(&self) {
        self.inner.shutdown.trigger();
        self.lock_pool().stop_and_join();
        info!(service = %self.inner.name, "Service stopped");
    }

    fn lock_pool(&self) -> std::sync::MutexGuard<'_, WorkerPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H: RequestHandler> Drop for Service<H> {
    fn drop(&mut self) {
        self.lock_pool().stop_and_join();
    }
}
