//! Types shared by the weighted A* search and its callers

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::PlannerError;
use crate::world::Cell;

const HORIZONTAL: [(i32, i32, i32); 4] = [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0)];
const VERTICAL: [(i32, i32, i32); 2] = [(0, 0, 1), (0, 0, -1)];
const ALL_AXES: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];
const DIG: [(i32, i32, i32); 5] = [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, -1)];

/// Kind of movement between two adjacent cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Walk,
    Climb,
    Swim,
    Dig,
    Fly,
}

impl MoveKind {
    /// Enumeration order used by the search. Changing it changes which of
    /// several equal-cost paths is returned.
    pub const ALL: [MoveKind; 5] = [
        MoveKind::Walk,
        MoveKind::Climb,
        MoveKind::Swim,
        MoveKind::Dig,
        MoveKind::Fly,
    ];

    /// Direction offsets this kind of move can take, in enumeration order
    pub fn offsets(self) -> &'static [(i32, i32, i32)] {
        match self {
            MoveKind::Walk => &HORIZONTAL,
            MoveKind::Climb => &VERTICAL,
            MoveKind::Swim | MoveKind::Fly => &ALL_AXES,
            MoveKind::Dig => &DIG,
        }
    }
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveKind::Walk => write!(f, "walk"),
            MoveKind::Climb => write!(f, "climb"),
            MoveKind::Swim => write!(f, "swim"),
            MoveKind::Dig => write!(f, "dig"),
            MoveKind::Fly => write!(f, "fly"),
        }
    }
}

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MoveAction {
    pub from: Cell,
    pub to: Cell,
    pub kind: MoveKind,
    pub cost: f32,
}

/// Arbitrary goal test over a cell
#[derive(Clone)]
pub struct GoalPredicate(Arc<dyn Fn(Cell) -> bool + Send + Sync>);

impl GoalPredicate {
    pub fn new(predicate: impl Fn(Cell) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }
}

impl std::fmt::Debug for GoalPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GoalPredicate(..)")
    }
}

/// Set of cells that count as arriving
#[derive(Debug, Clone)]
pub enum GoalRegion {
    /// Only the home cell
    Exact,
    /// The home cell or any face neighbor of it (stand next to a target)
    Adjacent,
    /// Any cell within this Manhattan distance of home
    Within(u32),
    /// Caller-defined test; home only steers the heuristic
    Custom(GoalPredicate),
}

/// Goal region plus the representative cell used for heuristic distance
#[derive(Debug, Clone)]
pub struct Goal {
    pub home: Cell,
    pub region: GoalRegion,
}

impl Goal {
    pub fn exact(home: Cell) -> Self {
        Self {
            home,
            region: GoalRegion::Exact,
        }
    }

    pub fn adjacent(home: Cell) -> Self {
        Self {
            home,
            region: GoalRegion::Adjacent,
        }
    }

    pub fn within(home: Cell, radius: u32) -> Self {
        Self {
            home,
            region: GoalRegion::Within(radius),
        }
    }

    pub fn custom(home: Cell, predicate: impl Fn(Cell) -> bool + Send + Sync + 'static) -> Self {
        Self {
            home,
            region: GoalRegion::Custom(GoalPredicate::new(predicate)),
        }
    }

    pub fn is_satisfied(&self, cell: Cell) -> bool {
        match &self.region {
            GoalRegion::Exact => cell == self.home,
            GoalRegion::Adjacent => cell.manhattan(self.home) <= 1,
            GoalRegion::Within(radius) => cell.manhattan(self.home) <= *radius,
            GoalRegion::Custom(predicate) => (predicate.0)(cell),
        }
    }

    /// Lower bound on the number of steps from `cell` into the region.
    /// For custom goals this is the distance to home and may overestimate.
    pub fn distance_bound(&self, cell: Cell) -> u32 {
        let distance = cell.manhattan(self.home);
        match &self.region {
            GoalRegion::Exact | GoalRegion::Custom(_) => distance,
            GoalRegion::Adjacent => distance.saturating_sub(1),
            GoalRegion::Within(radius) => distance.saturating_sub(*radius),
        }
    }
}

/// Heuristic inflation factor, always finite and `>= 1`.
///
/// `1.0` gives classic cost-optimal A*. Larger values search greedier.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct HeuristicWeight(f32);

impl HeuristicWeight {
    pub const OPTIMAL: HeuristicWeight = HeuristicWeight(1.0);

    pub fn new(weight: f32) -> Result<Self, PlannerError> {
        if weight.is_finite() && weight >= 1.0 {
            Ok(Self(weight))
        } else {
            Err(PlannerError::InvalidWeight(weight))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn max(self, other: HeuristicWeight) -> HeuristicWeight {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl Default for HeuristicWeight {
    fn default() -> Self {
        Self::OPTIMAL
    }
}

/// Budget for a single search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_expansions: usize,
    /// The liveness callback runs before the first expansion and then
    /// every `liveness_interval` expansions.
    pub liveness_interval: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_expansions: crate::config::DEFAULT_MAX_EXPANSIONS,
            liveness_interval: crate::config::DEFAULT_LIVENESS_INTERVAL,
        }
    }
}

/// Result code of a search. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Success,
    NoPath,
    ExpansionLimitReached,
    Cancelled,
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanStatus::Success => write!(f, "success"),
            PlanStatus::NoPath => write!(f, "no_path"),
            PlanStatus::ExpansionLimitReached => write!(f, "expansion_limit_reached"),
            PlanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub status: PlanStatus,
    /// Empty unless `status` is `Success`
    pub path: Vec<MoveAction>,
    pub cost: f32,
    pub expansions: usize,
}

impl PlanOutcome {
    pub fn success(path: Vec<MoveAction>, cost: f32, expansions: usize) -> Self {
        Self {
            status: PlanStatus::Success,
            path,
            cost,
            expansions,
        }
    }

    pub fn failed(status: PlanStatus, expansions: usize) -> Self {
        Self {
            status,
            path: Vec::new(),
            cost: 0.0,
            expansions,
        }
    }

    pub fn cancelled() -> Self {
        Self::failed(PlanStatus::Cancelled, 0)
    }

    pub fn is_success(&self) -> bool {
        self.status == PlanStatus::Success
    }
}
