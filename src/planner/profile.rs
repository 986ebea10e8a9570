use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::world::{Cell, Voxel, VoxelSource};

use super::types::MoveKind;

/// Per-agent movement rules consulted by the search.
///
/// Implementations must be pure reads: the same world and arguments always
/// give the same answer for the duration of one search.
pub trait MovementProfile: Send + Sync {
    /// Whether the agent may stand in `cell` at all. Used to reject start cells.
    fn can_occupy(&self, world: &dyn VoxelSource, cell: Cell) -> bool;

    /// Cost of moving `from -> to` with `kind`, or `None` if the move is not
    /// permitted right now.
    fn step_cost(&self, world: &dyn VoxelSource, from: Cell, to: Cell, kind: MoveKind) -> Option<f32>;

    /// Cheapest single step this profile can take; scales the heuristic.
    fn min_step_cost(&self) -> f32;
}

/// Data-driven profile: a cost per move kind, `None` meaning the agent cannot
/// move that way.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct AgentProfile {
    #[serde(default)]
    pub walk: Option<f32>,

    #[serde(default)]
    pub climb: Option<f32>,

    #[serde(default)]
    pub swim: Option<f32>,

    #[serde(default)]
    pub dig: Option<f32>,

    #[serde(default)]
    pub fly: Option<f32>,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            walk: Some(1.0),
            climb: Some(2.0),
            swim: None,
            dig: None,
            fly: None,
        }
    }
}

impl AgentProfile {
    /// Walks only, every step costing `cost`
    pub fn walker(cost: f32) -> Self {
        Self {
            walk: Some(cost),
            climb: None,
            swim: None,
            dig: None,
            fly: None,
        }
    }

    pub fn cost_of(&self, kind: MoveKind) -> Option<f32> {
        match kind {
            MoveKind::Walk => self.walk,
            MoveKind::Climb => self.climb,
            MoveKind::Swim => self.swim,
            MoveKind::Dig => self.dig,
            MoveKind::Fly => self.fly,
        }
    }

    fn permits(&self, world: &dyn VoxelSource, from: Cell, to: Cell, kind: MoveKind) -> bool {
        let Some(target) = world.voxel(to) else {
            return false;
        };

        match kind {
            MoveKind::Walk => {
                matches!(target, Voxel::Air | Voxel::Ladder) && world.is_supported(to)
            }
            MoveKind::Climb => {
                matches!(target, Voxel::Air | Voxel::Ladder)
                    && (target == Voxel::Ladder || world.voxel(from) == Some(Voxel::Ladder))
            }
            MoveKind::Swim => target == Voxel::Water,
            MoveKind::Dig => target == Voxel::Solid,
            MoveKind::Fly => target == Voxel::Air,
        }
    }
}

impl MovementProfile for AgentProfile {
    fn can_occupy(&self, world: &dyn VoxelSource, cell: Cell) -> bool {
        match world.voxel(cell) {
            Some(Voxel::Air | Voxel::Ladder) => true,
            Some(Voxel::Water) => self.swim.is_some(),
            Some(Voxel::Solid) | None => false,
        }
    }

    fn step_cost(&self, world: &dyn VoxelSource, from: Cell, to: Cell, kind: MoveKind) -> Option<f32> {
        let cost = self.cost_of(kind)?;
        self.permits(world, from, to, kind).then_some(cost)
    }

    fn min_step_cost(&self) -> f32 {
        MoveKind::ALL
            .iter()
            .filter_map(|kind| self.cost_of(*kind))
            .fold(None, |min: Option<f32>, cost| Some(min.map_or(cost, |m| m.min(cost))))
            .unwrap_or(0.0)
    }
}
