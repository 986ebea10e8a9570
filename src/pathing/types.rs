use std::sync::Arc;

use crate::planner::{Goal, HeuristicWeight, MovementProfile, PlanOutcome, PlanStatus};
use crate::service::Envelope;
use crate::world::{Cell, VoxelSource};

/// One path query. World and profile are shared read-only with the worker
/// that handles it.
#[derive(Clone)]
pub struct PathRequest {
    pub start: Cell,
    pub goal: Goal,
    pub world: Arc<dyn VoxelSource>,
    pub profile: Arc<dyn MovementProfile>,
    /// Expansion cap, service default when unset
    pub max_expansions: Option<usize>,
    /// Heuristic weight floor, service default when unset. Pressure may raise it.
    pub weight: Option<HeuristicWeight>,
}

impl PathRequest {
    pub fn new(
        world: Arc<dyn VoxelSource>,
        profile: Arc<dyn MovementProfile>,
        start: Cell,
        goal: Goal,
    ) -> Self {
        Self {
            start,
            goal,
            world,
            profile,
            max_expansions: None,
            weight: None,
        }
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_weight(mut self, weight: HeuristicWeight) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl std::fmt::Debug for PathRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRequest")
            .field("start", &self.start)
            .field("goal", &self.goal)
            .field("max_expansions", &self.max_expansions)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Answer to a `PathRequest`, carrying the request it answers
#[derive(Debug, Clone)]
pub struct PathResponse {
    pub request: Envelope<PathRequest>,
    pub outcome: PlanOutcome,
    /// Weight the search actually ran with
    pub weight: HeuristicWeight,
}

impl PathResponse {
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn status(&self) -> PlanStatus {
        self.outcome.status
    }

    pub fn sequence(&self) -> u64 {
        self.request.sequence
    }
}
