//! Cancellation-aware weighted A* over a voxel world
//!
//! The search is a pure function of its inputs:
//! 1. A read-only world (`VoxelSource`) and a per-agent `MovementProfile`
//! 2. A start cell and a `Goal` region with a representative home cell
//! 3. A heuristic weight and an expansion budget
//! 4. A liveness callback polled every few expansions
//!
//! Every way a search can end is reported as a `PlanStatus`, never as an error.

pub mod profile;
pub mod search;
pub mod types;

pub use profile::{AgentProfile, MovementProfile};
pub use search::{find_path, SearchProblem};
pub use types::{
    Goal, GoalRegion, HeuristicWeight, MoveAction, MoveKind, PlanOutcome, PlanStatus,
    SearchLimits,
};
