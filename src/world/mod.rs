//! World data consumed by the planner: voxel coordinates, a read-only voxel
//! source and a text map loader.

mod cell;
mod grid;
mod loader;

pub use cell::Cell;
pub use grid::{Voxel, VoxelGrid, VoxelSource};
pub use loader::{load_map, parse_map, MapFile};
