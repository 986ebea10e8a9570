//! The planner wired into the task service
//!
//! `PlanningHandler` turns each `PathRequest` into a `PathResponse`, skipping
//! the search entirely when the request has already been superseded and
//! re-checking that while it searches. `PathTracker` is the caller-side state
//! machine that polls for the answer once per tick.

mod handler;
mod tracker;
mod types;

pub use handler::{PlanningHandler, PlanningService};
pub use tracker::{FailureReason, PathPlan, PathTracker, TrackerState};
pub use types::{PathRequest, PathResponse};
