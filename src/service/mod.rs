//! Generic multi-threaded request/response service
//!
//! 1. A `Subscriber` stamps each request with its id and a sequence number and
//!    pushes it onto the service's lock-free queue, then signals a worker
//! 2. Workers block until there is work or shutdown, then drain the queue,
//!    calling the `RequestHandler` for each request
//! 3. Each response is pushed onto the response queue of the subscriber whose
//!    id matches the request's origin, if it is still registered
//! 4. Callers poll their own queue; no operation here blocks the caller

mod handler;
mod pool;
mod registry;
mod shutdown;
mod subscriber;

pub use handler::{Envelope, RequestContext, RequestHandler, SubscriberId};
pub use pool::Service;
pub use shutdown::ShutdownToken;
pub use subscriber::Subscriber;
