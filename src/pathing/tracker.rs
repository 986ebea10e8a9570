use serde::Serialize;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::planner::{MoveAction, PlanStatus};
use crate::service::Subscriber;

use super::handler::{PlanningHandler, PlanningService};
use super::types::{PathRequest, PathResponse};

/// A path delivered to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathPlan {
    pub path: Vec<MoveAction>,
    pub cost: f32,
    pub expansions: usize,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NoPath,
    ExpansionLimitReached,
    Cancelled,
    /// No response within the tick budget; the request may have been dropped
    TimedOut,
    /// The service refused the request (shut down)
    Unavailable,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoPath => write!(f, "no_path"),
            FailureReason::ExpansionLimitReached => write!(f, "expansion_limit_reached"),
            FailureReason::Cancelled => write!(f, "cancelled"),
            FailureReason::TimedOut => write!(f, "timed_out"),
            FailureReason::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerState {
    Idle,
    Waiting { attempt: u32, ticks: u32 },
    Succeeded(PathPlan),
    Failed(FailureReason),
}

impl TrackerState {
    pub fn is_waiting(&self) -> bool {
        matches!(self, TrackerState::Waiting { .. })
    }
}

/// Per-agent polling state machine over a planning subscriber.
///
/// Call `begin` to ask for a path and `tick` once per simulation step.
/// Only the response to the most recent send is acted on. Running out of
/// expansions retries with a larger budget; silence past the timeout is
/// treated as a failure.
pub struct PathTracker {
    subscriber: Subscriber<PlanningHandler>,
    policy: TrackerConfig,
    default_budget: usize,
    state: TrackerState,
    request: Option<PathRequest>,
    budget: usize,
    sequence: u64,
}

impl PathTracker {
    pub fn new(service: &PlanningService, policy: TrackerConfig) -> Self {
        let subscriber = Subscriber::new(service);
        subscriber.subscribe();
        Self {
            subscriber,
            policy,
            default_budget: service.handler().limits().max_expansions,
            state: TrackerState::Idle,
            request: None,
            budget: 0,
            sequence: 0,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn subscriber(&self) -> &Subscriber<PlanningHandler> {
        &self.subscriber
    }

    /// Ask for a new path, superseding anything in flight
    pub fn begin(&mut self, request: PathRequest) -> &TrackerState {
        self.budget = request.max_expansions.unwrap_or(self.default_budget);
        self.request = Some(request);
        self.submit(1);
        &self.state
    }

    /// Give up on the current request
    pub fn cancel(&mut self) {
        self.subscriber.cancel();
        self.request = None;
        self.state = TrackerState::Idle;
    }

    /// Poll for the response to the latest request and advance the state
    pub fn tick(&mut self) -> &TrackerState {
        let TrackerState::Waiting { attempt, ticks } = self.state else {
            // late responses to finished requests are discarded
            self.subscriber.drain();
            return &self.state;
        };

        let current = self
            .subscriber
            .drain()
            .into_iter()
            .filter(|response| response.sequence() == self.sequence)
            .last();

        match current {
            Some(response) => self.on_response(response, attempt),
            None if ticks + 1 >= self.policy.timeout_ticks => {
                warn!(
                    subscriber = %self.subscriber.id(),
                    ticks = ticks + 1,
                    "No planner response, giving up"
                );
                self.subscriber.cancel();
                self.state = TrackerState::Failed(FailureReason::TimedOut);
            }
            None => {
                self.state = TrackerState::Waiting {
                    attempt,
                    ticks: ticks + 1,
                };
            }
        }

        &self.state
    }

    fn on_response(&mut self, response: PathResponse, attempt: u32) {
        self.state = match response.status() {
            PlanStatus::Success => TrackerState::Succeeded(PathPlan {
                path: response.outcome.path,
                cost: response.outcome.cost,
                expansions: response.outcome.expansions,
                attempts: attempt,
            }),
            PlanStatus::ExpansionLimitReached if attempt < self.policy.max_attempts => {
                self.budget = self.budget.saturating_mul(self.policy.budget_growth);
                debug!(
                    subscriber = %self.subscriber.id(),
                    attempt = attempt + 1,
                    budget = self.budget,
                    "Expansion limit reached, retrying with a larger budget"
                );
                self.submit(attempt + 1);
                return;
            }
            PlanStatus::ExpansionLimitReached => TrackerState::Failed(FailureReason::ExpansionLimitReached),
            PlanStatus::NoPath => TrackerState::Failed(FailureReason::NoPath),
            PlanStatus::Cancelled => TrackerState::Failed(FailureReason::Cancelled),
        };
    }

    fn submit(&mut self, attempt: u32) {
        let Some(request) = self.request.clone() else {
            self.state = TrackerState::Idle;
            return;
        };

        match self
            .subscriber
            .send_request(request.with_max_expansions(self.budget))
        {
            Ok(sequence) => {
                self.sequence = sequence;
                self.state = TrackerState::Waiting { attempt, ticks: 0 };
            }
            Err(e) => {
                warn!(subscriber = %self.subscriber.id(), "Failed to submit path request: {}", e);
                self.state = TrackerState::Failed(FailureReason::Unavailable);
            }
        }
    }
}
