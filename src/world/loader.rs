use std::path::Path;

use crate::error::MapError;

use super::{Cell, Voxel, VoxelGrid};

const LAYER_SEPARATOR: &str = "---";

/// A parsed map plus the optional `S`/`G` markers found in it
#[derive(Debug, Clone)]
pub struct MapFile {
    pub grid: VoxelGrid,
    pub start: Option<Cell>,
    pub goal: Option<Cell>,
}

/// Load a text map from disk
pub fn load_map(path: &Path) -> Result<MapFile, MapError> {
    let content = std::fs::read_to_string(path).map_err(|e| MapError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_map(&content)
}

/// Parse a text map.
///
/// One glyph per cell, rows are `y`, columns are `x`. Layers are separated by a
/// `---` line, the first layer is `z = 0`. Blank lines are ignored.
pub fn parse_map(content: &str) -> Result<MapFile, MapError> {
    let mut layers: Vec<Vec<&str>> = vec![Vec::new()];
    for line in content.lines() {
        let line = line.trim_end();
        if line.trim() == LAYER_SEPARATOR {
            layers.push(Vec::new());
        } else if !line.is_empty() {
            if let Some(layer) = layers.last_mut() {
                layer.push(line);
            }
        }
    }
    layers.retain(|layer| !layer.is_empty());

    let first = layers.first().ok_or(MapError::Empty)?;
    let rows = first.len();
    let width = first[0].chars().count();

    let mut start = None;
    let mut goal = None;
    let mut voxels = Vec::with_capacity(layers.len());

    for (z, layer) in layers.iter().enumerate() {
        if layer.len() != rows {
            return Err(MapError::RaggedLayer {
                layer: z,
                found: layer.len(),
                expected: rows,
            });
        }

        let mut layer_voxels = Vec::with_capacity(rows);
        for (y, row) in layer.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    layer: z,
                    row: y,
                    found,
                    expected: width,
                });
            }

            let mut row_voxels = Vec::with_capacity(width);
            for (x, glyph) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32, z as i32);
                let voxel = match glyph {
                    'S' => {
                        start = Some(cell);
                        Voxel::Air
                    }
                    'G' => {
                        goal = Some(cell);
                        Voxel::Air
                    }
                    other => Voxel::from_glyph(other).ok_or(MapError::UnknownGlyph {
                        glyph: other,
                        layer: z,
                        row: y,
                        column: x,
                    })?,
                };
                row_voxels.push(voxel);
            }
            layer_voxels.push(row_voxels);
        }
        voxels.push(layer_voxels);
    }

    Ok(MapFile {
        grid: VoxelGrid::from_layers(voxels),
        start,
        goal,
    })
}
