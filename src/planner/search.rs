use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::trace;

use crate::world::{Cell, VoxelSource};

use super::profile::MovementProfile;
use super::types::{Goal, HeuristicWeight, MoveAction, MoveKind, PlanOutcome, PlanStatus, SearchLimits};

/// Everything a single search reads. Nothing here is mutated by the search.
pub struct SearchProblem<'a> {
    pub world: &'a dyn VoxelSource,
    pub profile: &'a dyn MovementProfile,
    pub start: Cell,
    pub goal: &'a Goal,
    pub weight: HeuristicWeight,
    pub limits: SearchLimits,
}

/// Open-set entry. Lowest `priority` pops first; equal priorities pop in
/// insertion order so identical inputs always yield identical paths.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: Cell,
    g: f32,
    priority: f32,
    order: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted A* from `problem.start` to any cell satisfying `problem.goal`.
///
/// `is_live` is polled before the first expansion and every
/// `liveness_interval` expansions after that; once it returns false the
/// search stops with `Cancelled`. At most `max_expansions` cells are
/// expanded.
pub fn find_path<F>(problem: &SearchProblem<'_>, mut is_live: F) -> PlanOutcome
where
    F: FnMut() -> bool,
{
    let SearchProblem {
        world,
        profile,
        start,
        goal,
        weight,
        limits,
    } = *problem;

    if !profile.can_occupy(world, start) {
        return PlanOutcome::failed(PlanStatus::NoPath, 0);
    }
    if goal.is_satisfied(start) {
        return PlanOutcome::success(Vec::new(), 0.0, 0);
    }

    let step_scale = profile.min_step_cost();
    let heuristic = |cell: Cell| goal.distance_bound(cell) as f32 * step_scale;
    let liveness_interval = limits.liveness_interval.max(1);

    let mut open = BinaryHeap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut g_score: HashMap<Cell, f32> = HashMap::new();
    let mut came_from: HashMap<Cell, MoveAction> = HashMap::new();
    let mut order = 0u64;
    let mut expansions = 0usize;

    g_score.insert(start, 0.0);
    open.push(OpenNode {
        cell: start,
        g: 0.0,
        priority: weight.get() * heuristic(start),
        order,
    });

    while let Some(current) = open.pop() {
        if closed.contains(&current.cell) {
            continue;
        }

        if goal.is_satisfied(current.cell) {
            let path = reconstruct_path(&came_from, start, current.cell);
            trace!(
                expansions,
                steps = path.len(),
                cost = current.g,
                "Path found"
            );
            return PlanOutcome::success(path, current.g, expansions);
        }

        if expansions % liveness_interval == 0 && !is_live() {
            trace!(expansions, "Search cancelled");
            return PlanOutcome::failed(PlanStatus::Cancelled, expansions);
        }

        if expansions >= limits.max_expansions {
            trace!(expansions, "Expansion limit reached");
            return PlanOutcome::failed(PlanStatus::ExpansionLimitReached, expansions);
        }

        closed.insert(current.cell);
        expansions += 1;

        for kind in MoveKind::ALL {
            for offset in kind.offsets() {
                let neighbor = current.cell.offset(*offset);
                if closed.contains(&neighbor) {
                    continue;
                }

                let Some(step) = profile.step_cost(world, current.cell, neighbor, kind) else {
                    continue;
                };
                // negative or NaN costs would break the search invariants
                if !(step.is_finite() && step >= 0.0) {
                    continue;
                }

                let tentative_g = current.g + step;
                let known = g_score.get(&neighbor).copied().unwrap_or(f32::INFINITY);
                if tentative_g < known {
                    g_score.insert(neighbor, tentative_g);
                    came_from.insert(
                        neighbor,
                        MoveAction {
                            from: current.cell,
                            to: neighbor,
                            kind,
                            cost: step,
                        },
                    );
                    order += 1;
                    open.push(OpenNode {
                        cell: neighbor,
                        g: tentative_g,
                        priority: tentative_g + weight.get() * heuristic(neighbor),
                        order,
                    });
                }
            }
        }
    }

    trace!(expansions, "Open set exhausted");
    PlanOutcome::failed(PlanStatus::NoPath, expansions)
}

fn reconstruct_path(came_from: &HashMap<Cell, MoveAction>, start: Cell, end: Cell) -> Vec<MoveAction> {
    let mut path = Vec::new();
    let mut cursor = end;
    while cursor != start {
        match came_from.get(&cursor) {
            Some(action) => {
                path.push(*action);
                cursor = action.from;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::AgentProfile;
    use crate::world::{parse_map, Voxel, VoxelGrid};
    use std::cell::Cell as Counter;

    fn open_grid(size: usize) -> VoxelGrid {
        VoxelGrid::new(size, size, 1)
    }

    fn limits(max_expansions: usize) -> SearchLimits {
        SearchLimits {
            max_expansions,
            liveness_interval: 1,
        }
    }

    fn solve(
        world: &VoxelGrid,
        profile: &AgentProfile,
        start: Cell,
        goal: &Goal,
        weight: f32,
        max_expansions: usize,
    ) -> PlanOutcome {
        let problem = SearchProblem {
            world,
            profile,
            start,
            goal,
            weight: HeuristicWeight::new(weight).unwrap(),
            limits: limits(max_expansions),
        };
        find_path(&problem, || true)
    }

    /// Profile that refuses every move
    struct Frozen;

    impl MovementProfile for Frozen {
        fn can_occupy(&self, _world: &dyn VoxelSource, _cell: Cell) -> bool {
            true
        }

        fn step_cost(&self, _world: &dyn VoxelSource, _from: Cell, _to: Cell, _kind: MoveKind) -> Option<f32> {
            None
        }

        fn min_step_cost(&self) -> f32 {
            1.0
        }
    }

    #[test]
    fn test_open_grid_optimal_path() {
        let world = open_grid(5);
        let goal = Goal::exact(Cell::new(4, 4, 0));
        let outcome = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, 1000);

        assert_eq!(outcome.status, PlanStatus::Success);
        assert_eq!(outcome.path.len(), 8);
        assert_eq!(outcome.cost, 8.0);
        assert_eq!(outcome.path.first().unwrap().from, Cell::new(0, 0, 0));
        assert_eq!(outcome.path.last().unwrap().to, Cell::new(4, 4, 0));

        // consecutive steps chain
        for pair in outcome.path.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
    }

    #[test]
    fn test_blocked_cell_is_avoided() {
        let mut world = open_grid(5);
        world.set(Cell::new(2, 2, 0), Voxel::Solid);
        let goal = Goal::exact(Cell::new(4, 4, 0));
        let outcome = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, 1000);

        assert_eq!(outcome.status, PlanStatus::Success);
        assert_eq!(outcome.path.len(), 8);
        assert!(outcome.path.iter().all(|step| step.to != Cell::new(2, 2, 0)));
    }

    #[test]
    fn test_expansion_cap() {
        let world = open_grid(5);
        let goal = Goal::exact(Cell::new(4, 4, 0));
        let outcome = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, 3);

        assert_eq!(outcome.status, PlanStatus::ExpansionLimitReached);
        assert_eq!(outcome.expansions, 3);
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn test_cap_is_never_exceeded() {
        let world = open_grid(12);
        let goal = Goal::exact(Cell::new(11, 11, 0));
        for cap in [0, 1, 5, 17, 40] {
            let outcome = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, cap);
            assert!(outcome.expansions <= cap);
            assert_eq!(outcome.status, PlanStatus::ExpansionLimitReached);
        }
    }

    #[test]
    fn test_start_satisfies_goal() {
        let world = open_grid(3);
        let goal = Goal::adjacent(Cell::new(1, 0, 0));
        let outcome = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, 10);

        assert_eq!(outcome.status, PlanStatus::Success);
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.cost, 0.0);
        assert_eq!(outcome.expansions, 0);
    }

    #[test]
    fn test_blocked_start_has_no_path() {
        let mut world = open_grid(3);
        world.set(Cell::new(0, 0, 0), Voxel::Solid);
        let goal = Goal::exact(Cell::new(2, 2, 0));
        let outcome = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, 10);

        assert_eq!(outcome.status, PlanStatus::NoPath);
        assert_eq!(outcome.expansions, 0);
    }

    #[test]
    fn test_no_permitted_moves() {
        let world = open_grid(4);
        let goal = Goal::exact(Cell::new(3, 3, 0));
        let problem = SearchProblem {
            world: &world,
            profile: &Frozen,
            start: Cell::new(0, 0, 0),
            goal: &goal,
            weight: HeuristicWeight::OPTIMAL,
            limits: limits(100),
        };
        let outcome = find_path(&problem, || true);

        assert_eq!(outcome.status, PlanStatus::NoPath);
        assert_eq!(outcome.expansions, 1);
    }

    #[test]
    fn test_walled_off_goal() {
        let map = parse_map("S.#..\n..#..\n..#.G\n").unwrap();
        let goal = Goal::exact(map.goal.unwrap());
        let outcome = solve(&map.grid, &AgentProfile::walker(1.0), map.start.unwrap(), &goal, 1.0, 1000);

        assert_eq!(outcome.status, PlanStatus::NoPath);
        assert_eq!(outcome.expansions, 6);
    }

    #[test]
    fn test_cancelled_before_first_expansion() {
        let world = open_grid(5);
        let goal = Goal::exact(Cell::new(4, 4, 0));
        let problem = SearchProblem {
            world: &world,
            profile: &AgentProfile::walker(1.0),
            start: Cell::new(0, 0, 0),
            goal: &goal,
            weight: HeuristicWeight::OPTIMAL,
            limits: limits(1000),
        };
        let outcome = find_path(&problem, || false);

        assert_eq!(outcome.status, PlanStatus::Cancelled);
        assert_eq!(outcome.expansions, 0);
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn test_cancelled_mid_search_respects_interval() {
        let world = open_grid(20);
        let goal = Goal::exact(Cell::new(19, 19, 0));
        let checks = Counter::new(0usize);
        let problem = SearchProblem {
            world: &world,
            profile: &AgentProfile::walker(1.0),
            start: Cell::new(0, 0, 0),
            goal: &goal,
            weight: HeuristicWeight::OPTIMAL,
            limits: SearchLimits {
                max_expansions: 10_000,
                liveness_interval: 4,
            },
        };
        let outcome = find_path(&problem, || {
            checks.set(checks.get() + 1);
            checks.get() < 3
        });

        assert_eq!(outcome.status, PlanStatus::Cancelled);
        // checks ran at 0, 4 and 8 expansions
        assert_eq!(outcome.expansions, 8);
    }

    #[test]
    fn test_deterministic_paths() {
        let map = parse_map(
            "S.....\n\
             .##.#.\n\
             ...#..\n\
             .#...G\n",
        )
        .unwrap();
        let goal = Goal::exact(map.goal.unwrap());
        let first = solve(&map.grid, &AgentProfile::walker(1.0), map.start.unwrap(), &goal, 1.0, 1000);
        let second = solve(&map.grid, &AgentProfile::walker(1.0), map.start.unwrap(), &goal, 1.0, 1000);

        assert_eq!(first.status, PlanStatus::Success);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.path).unwrap(),
            serde_json::to_string(&second.path).unwrap()
        );
    }

    #[test]
    fn test_weighted_search_expands_less() {
        let world = open_grid(30);
        let goal = Goal::exact(Cell::new(29, 29, 0));
        let optimal = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 1.0, 100_000);
        let greedy = solve(&world, &AgentProfile::walker(1.0), Cell::new(0, 0, 0), &goal, 3.0, 100_000);

        assert!(optimal.is_success());
        assert!(greedy.is_success());
        assert!(greedy.cost >= optimal.cost);
        assert!(greedy.expansions <= optimal.expansions);
    }

    #[test]
    fn test_cheaper_detour_preferred() {
        // water is cheap to swim through, walking around is long
        let map = parse_map(
            "S~~~G\n\
             .###.\n\
             .....\n",
        )
        .unwrap();
        let swimmer = AgentProfile {
            walk: Some(1.0),
            climb: None,
            swim: Some(0.5),
            dig: None,
            fly: None,
        };
        let goal = Goal::exact(map.goal.unwrap());
        let outcome = solve(&map.grid, &swimmer, map.start.unwrap(), &goal, 1.0, 1000);

        assert!(outcome.is_success());
        assert_eq!(outcome.path.len(), 4);
        assert_eq!(outcome.cost, 2.5);
        assert_eq!(outcome.path[0].kind, MoveKind::Swim);
        assert_eq!(outcome.path[3].kind, MoveKind::Walk);
    }

    #[test]
    fn test_climb_between_layers() {
        let goal = Goal::exact(Cell::new(0, 0, 1));
        let start = Cell::new(2, 0, 0);

        // upper walkway floats over air, nothing to walk on
        let unsupported = parse_map("..H\n---\nG.H\n").unwrap();
        let outcome = solve(&unsupported.grid, &AgentProfile::default(), start, &goal, 1.0, 1000);
        assert_eq!(outcome.status, PlanStatus::NoPath);

        let floored = parse_map("##H\n---\nG.H\n").unwrap();
        let outcome = solve(&floored.grid, &AgentProfile::default(), start, &goal, 1.0, 1000);

        assert!(outcome.is_success());
        let kinds: Vec<_> = outcome.path.iter().map(|step| step.kind).collect();
        assert_eq!(kinds, vec![MoveKind::Climb, MoveKind::Walk, MoveKind::Walk]);
        assert_eq!(outcome.cost, 4.0);
    }
}
