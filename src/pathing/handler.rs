use tracing::debug;

use crate::config::{Config, PressureConfig};
use crate::error::PlannerError;
use crate::planner::{find_path, HeuristicWeight, PlanOutcome, SearchLimits, SearchProblem};
use crate::service::{Envelope, RequestContext, RequestHandler, Service, ShutdownToken};

use super::types::{PathRequest, PathResponse};

pub type PlanningService = Service<PlanningHandler>;

/// Runs the planner for each request that is still wanted
#[derive(Debug, Clone)]
pub struct PlanningHandler {
    limits: SearchLimits,
    default_weight: HeuristicWeight,
    pressure: PressureConfig,
}

impl PlanningHandler {
    pub fn new(limits: SearchLimits, default_weight: HeuristicWeight, pressure: PressureConfig) -> Self {
        Self {
            limits,
            default_weight,
            pressure,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, PlannerError> {
        Ok(Self::new(
            config.search_limits(),
            HeuristicWeight::new(config.planner.heuristic_weight)?,
            config.pressure.clone(),
        ))
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Weight for a request given the current backlog.
    ///
    /// Each `threshold` outstanding requests add `step` on top of the default
    /// weight. A weight the request asked for is kept if it is higher, and the
    /// result never exceeds `max_weight`.
    pub fn effective_weight(&self, requested: Option<HeuristicWeight>, pending: usize) -> HeuristicWeight {
        let base = requested.unwrap_or(self.default_weight);
        if !self.pressure.enabled || self.pressure.threshold == 0 {
            return base;
        }

        let steps = (pending / self.pressure.threshold) as f32;
        let pressured = self.default_weight.get() + self.pressure.step * steps;
        let weight = base.get().max(pressured).min(self.pressure.max_weight);
        HeuristicWeight::new(weight).unwrap_or(base)
    }
}

impl RequestHandler for PlanningHandler {
    type Request = PathRequest;
    type Response = PathResponse;

    fn handle(&self, envelope: Envelope<PathRequest>, ctx: &RequestContext<'_>) -> PathResponse {
        let request = &envelope.request;
        let weight = self.effective_weight(request.weight, ctx.pending());

        if !ctx.is_current() {
            debug!(
                origin = %envelope.origin,
                sequence = envelope.sequence,
                "Request superseded before search"
            );
            return PathResponse {
                request: envelope,
                outcome: PlanOutcome::cancelled(),
                weight,
            };
        }

        let limits = SearchLimits {
            max_expansions: request.max_expansions.unwrap_or(self.limits.max_expansions),
            liveness_interval: self.limits.liveness_interval,
        };
        let problem = SearchProblem {
            world: request.world.as_ref(),
            profile: request.profile.as_ref(),
            start: request.start,
            goal: &request.goal,
            weight,
            limits,
        };
        let outcome = find_path(&problem, || ctx.is_current());

        debug!(
            origin = %envelope.origin,
            sequence = envelope.sequence,
            status = %outcome.status,
            expansions = outcome.expansions,
            weight = weight.get(),
            "Planned"
        );

        PathResponse {
            request: envelope,
            outcome,
            weight,
        }
    }
}

impl Service<PlanningHandler> {
    /// Planning service sized and tuned from `config`
    pub fn from_config(config: &Config, shutdown: ShutdownToken) -> Result<Self, PlannerError> {
        let handler = PlanningHandler::from_config(config)?;
        Ok(Self::new(
            config.service.name.clone(),
            handler,
            config.service.threads,
            shutdown,
        ))
    }
}
