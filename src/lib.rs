//! gridplan - voxel path planning on a shared pool of worker threads
//!
//! The [`service`] module is a generic request/response service: callers hold
//! a [`service::Subscriber`], send typed requests, and poll for the responses
//! addressed to them. [`pathing`] plugs the weighted A* from [`planner`] into
//! it, so many agents can ask for paths at once and abandon stale requests
//! cheaply.
//!
//! ```ignore
//! use gridplan::pathing::{PathRequest, PathTracker, PlanningService};
//!
//! let service = PlanningService::from_config(&config, shutdown.clone())?;
//! let mut tracker = PathTracker::new(&service, config.tracker.clone());
//! tracker.begin(PathRequest::new(world, profile, start, Goal::exact(goal)));
//! // once per tick
//! tracker.tick();
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pathing;
pub mod planner;
pub mod service;
pub mod simulation;
pub mod world;
