use crate::planner::{MoveAction, PlanOutcome};
use crate::world::{Cell, VoxelGrid};
use std::collections::HashSet;

const PATH_GLYPH: char = '*';
const START_GLYPH: char = 'S';
const GOAL_GLYPH: char = 'G';

/// Draw `grid` layer by layer with the path overlaid.
///
/// Start and goal markers win over the path glyph. Layers are printed bottom
/// up, each preceded by a `z = N` header when the map has more than one.
pub fn render_path(grid: &VoxelGrid, start: Cell, goal: Cell, path: &[MoveAction]) -> String {
    let visited: HashSet<Cell> = path.iter().map(|step| step.to).collect();
    let mut out = String::new();

    for z in 0..grid.height() {
        if grid.height() > 1 {
            out.push_str(&format!("z = {}\n", z));
        }
        for y in 0..grid.depth() {
            for x in 0..grid.width() {
                let cell = Cell::new(x as i32, y as i32, z as i32);
                let glyph = if cell == start {
                    START_GLYPH
                } else if cell == goal {
                    GOAL_GLYPH
                } else if visited.contains(&cell) {
                    PATH_GLYPH
                } else {
                    grid.get(cell).map(|v| v.glyph()).unwrap_or(' ')
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        if z + 1 < grid.height() {
            out.push('\n');
        }
    }

    out
}

/// One-line summary of a search result
pub fn describe_outcome(outcome: &PlanOutcome) -> String {
    if outcome.is_success() {
        format!(
            "{}: {} steps, cost {:.2}, {} expansions",
            outcome.status,
            outcome.path.len(),
            outcome.cost,
            outcome.expansions
        )
    } else {
        format!("{}: {} expansions", outcome.status, outcome.expansions)
    }
}
