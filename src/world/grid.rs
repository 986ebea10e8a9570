use serde::{Deserialize, Serialize};

use super::Cell;

/// Material occupying a single voxel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Voxel {
    #[default]
    Air,
    Solid,
    Water,
    Ladder,
}

impl Voxel {
    pub fn glyph(self) -> char {
        match self {
            Voxel::Air => '.',
            Voxel::Solid => '#',
            Voxel::Water => '~',
            Voxel::Ladder => 'H',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Voxel::Air),
            '#' => Some(Voxel::Solid),
            '~' => Some(Voxel::Water),
            'H' => Some(Voxel::Ladder),
            _ => None,
        }
    }
}

/// Read-only view of the world consulted by the planner.
///
/// Implementations must tolerate concurrent reads from every worker thread.
/// The planner never writes through this trait.
pub trait VoxelSource: Send + Sync {
    /// `None` when `cell` lies outside the world.
    fn voxel(&self, cell: Cell) -> Option<Voxel>;

    /// Whether something standing in `cell` has ground beneath it.
    /// Layer 0 rests on bedrock.
    fn is_supported(&self, cell: Cell) -> bool {
        cell.z == 0 || matches!(self.voxel(cell.below()), Some(Voxel::Solid | Voxel::Ladder))
    }
}

/// Dense voxel storage indexed `[z][y][x]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    width: usize,
    depth: usize,
    height: usize,
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// An all-air grid. `width` spans x, `depth` spans y, `height` spans z.
    pub fn new(width: usize, depth: usize, height: usize) -> Self {
        Self {
            width,
            depth,
            height,
            voxels: vec![Voxel::Air; width * depth * height],
        }
    }

    /// Build from layers of rows, `layers[z][y][x]`. Callers guarantee the
    /// shape is rectangular; see `world::parse_map` for validated input.
    pub fn from_layers(layers: Vec<Vec<Vec<Voxel>>>) -> Self {
        let height = layers.len();
        let depth = layers.first().map(Vec::len).unwrap_or(0);
        let width = layers
            .first()
            .and_then(|layer| layer.first())
            .map(Vec::len)
            .unwrap_or(0);

        let voxels = layers.into_iter().flatten().flatten().collect();
        Self {
            width,
            depth,
            height,
            voxels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    pub fn get(&self, cell: Cell) -> Option<Voxel> {
        self.index(cell).map(|idx| self.voxels[idx])
    }

    /// Returns false when `cell` is out of bounds.
    pub fn set(&mut self, cell: Cell, voxel: Voxel) -> bool {
        match self.index(cell) {
            Some(idx) => {
                self.voxels[idx] = voxel;
                true
            }
            None => false,
        }
    }

    /// All cells of the grid in `z, y, x` order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |z| {
            (0..self.depth)
                .flat_map(move |y| (0..self.width).map(move |x| Cell::new(x as i32, y as i32, z as i32)))
        })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        let z = usize::try_from(cell.z).ok()?;
        if x >= self.width || y >= self.depth || z >= self.height {
            return None;
        }
        Some((z * self.depth + y) * self.width + x)
    }
}

impl VoxelSource for VoxelGrid {
    fn voxel(&self, cell: Cell) -> Option<Voxel> {
        self.get(cell)
    }
}
