use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Integer voxel coordinate. `z` grows upward, `y` grows down the map rows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, JsonSchema,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, (dx, dy, dz): (i32, i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn below(self) -> Self {
        self.offset((0, 0, -1))
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl std::str::FromStr for Cell {
    type Err = MapError;

    /// Accepts `x,y` (z = 0) or `x,y,z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| MapError::InvalidCell(s.to_string()))?;

        match parts.as_slice() {
            [x, y] => Ok(Cell::new(*x, *y, 0)),
            [x, y, z] => Ok(Cell::new(*x, *y, *z)),
            _ => Err(MapError::InvalidCell(s.to_string())),
        }
    }
}
