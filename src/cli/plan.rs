use anyhow::{bail, Context};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{load_config, load_world, PlanArgs};
use gridplan::error::MapError;
use gridplan::output::{describe_outcome, render_path};
use gridplan::pathing::{PathRequest, PlanningService};
use gridplan::planner::{Goal, HeuristicWeight, MoveAction, PlanStatus};
use gridplan::service::{ShutdownToken, Subscriber, SubscriberId};
use gridplan::world::{Cell, VoxelGrid, VoxelSource};

/// How long to wait for the worker before assuming the request was dropped
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(2);

#[derive(Debug, Serialize)]
struct PlanReport {
    origin: SubscriberId,
    sequence: u64,
    start: Cell,
    goal: Cell,
    status: PlanStatus,
    cost: f32,
    expansions: usize,
    weight: f32,
    path: Vec<MoveAction>,
}

pub fn execute(args: PlanArgs, config_path: &std::path::Path, shutdown: ShutdownToken) -> anyhow::Result<()> {
    let mut config = load_config(config_path, args.threads)?;
    if let Some(max_expansions) = args.max_expansions {
        config.planner.max_expansions = max_expansions;
    }

    let map = load_world(&args.map)?;
    let start = resolve(&map.grid, args.start.or(map.start), "start", 'S')?;
    let home = resolve(&map.grid, args.goal.or(map.goal), "goal", 'G')?;

    let goal = if args.adjacent {
        Goal::adjacent(home)
    } else if let Some(radius) = args.within {
        Goal::within(home, radius)
    } else {
        Goal::exact(home)
    };

    let weight = args.weight.map(HeuristicWeight::new).transpose()?;
    let grid = Arc::new(map.grid);
    let world: Arc<dyn VoxelSource> = grid.clone();

    let mut request = PathRequest::new(world, Arc::new(config.profile.clone()), start, goal);
    if let Some(weight) = weight {
        request = request.with_weight(weight);
    }

    let service = PlanningService::from_config(&config, shutdown)?;
    let subscriber = Subscriber::new(&service);
    subscriber.subscribe();

    info!("Planning {} -> {} on '{}'", start, home, service.name());
    let sequence = subscriber.send_request(request)?;

    let deadline = Instant::now() + RESPONSE_TIMEOUT;
    let response = loop {
        if let Some(response) = subscriber.try_recv() {
            if response.sequence() == sequence {
                break response;
            }
            debug!(sequence = response.sequence(), "Ignoring stale response");
            continue;
        }
        if Instant::now() >= deadline {
            bail!(
                "No response from the planner within {}s",
                RESPONSE_TIMEOUT.as_secs()
            );
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    if args.json {
        let report = PlanReport {
            origin: response.request.origin,
            sequence: response.sequence(),
            start,
            goal: home,
            status: response.outcome.status,
            cost: response.outcome.cost,
            expansions: response.outcome.expansions,
            weight: response.weight.get(),
            path: response.outcome.path,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            render_path(&grid, start, home, &response.outcome.path)
        );
        println!();
        println!("{}", describe_outcome(&response.outcome));
        if response.weight != HeuristicWeight::OPTIMAL {
            println!("heuristic weight {:.2}", response.weight.get());
        }
    }

    Ok(())
}

fn resolve(grid: &VoxelGrid, cell: Option<Cell>, what: &str, glyph: char) -> anyhow::Result<Cell> {
    let cell = cell.with_context(|| format!("No {what}: pass --{what} or mark it with '{glyph}' in the map"))?;
    if !grid.contains(cell) {
        return Err(MapError::OutOfBounds(format!("{what} {cell}")).into());
    }
    Ok(cell)
}
