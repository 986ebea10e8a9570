//! Tick-driven multi-agent driver for the planning service.
//!
//! Every round each agent picks a random destination and asks for a path;
//! some change their mind straight away and replan, superseding the first
//! request. The main thread then ticks every tracker until none is waiting
//! and moves successful agents to the end of their path.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::pathing::{PathRequest, PathTracker, PlanningService, TrackerState};
use crate::planner::{Goal, MovementProfile};
use crate::world::{Cell, VoxelGrid, VoxelSource};

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub agents: usize,
    pub rounds: usize,
    pub seed: u64,
    /// Chance that an agent replans immediately after its first request
    pub replan_rate: f64,
    /// Pause between ticks
    pub tick_interval: Duration,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            agents: 8,
            rounds: 4,
            seed: 0,
            replan_rate: 0.1,
            tick_interval: Duration::from_millis(1),
        }
    }
}

#[derive(Debug, Default)]
pub struct SimulationReport {
    pub agents: usize,
    pub rounds: usize,
    pub ticks: u64,
    /// Final tracker outcome per request, keyed by `success` or failure reason
    pub outcomes: BTreeMap<String, usize>,
    pub superseded: usize,
    pub total_cost: f64,
    pub total_expansions: usize,
    pub total_attempts: u64,
    pub duration: Duration,
}

impl SimulationReport {
    pub fn requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn successes(&self) -> usize {
        self.outcomes.get("success").copied().unwrap_or(0)
    }
}

struct Agent {
    tracker: PathTracker,
    position: Cell,
}

/// Cells an agent with `profile` may stand in
pub fn free_cells(world: &VoxelGrid, profile: &dyn MovementProfile) -> Vec<Cell> {
    world
        .cells()
        .filter(|cell| profile.can_occupy(world, *cell) && world.is_supported(*cell))
        .collect()
}

pub fn run_simulation(
    service: &PlanningService,
    world: Arc<VoxelGrid>,
    profile: Arc<dyn MovementProfile>,
    policy: &TrackerConfig,
    options: &SimulationOptions,
) -> SimulationReport {
    let start = Instant::now();
    let mut report = SimulationReport {
        agents: options.agents,
        rounds: options.rounds,
        ..SimulationReport::default()
    };

    let free = free_cells(&world, profile.as_ref());
    if free.is_empty() {
        info!("No free cells, nothing to simulate");
        return report;
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let replan_rate = options.replan_rate.clamp(0.0, 1.0);
    let world_source: Arc<dyn VoxelSource> = world.clone();

    let mut agents: Vec<Agent> = (0..options.agents)
        .map(|_| Agent {
            tracker: PathTracker::new(service, policy.clone()),
            position: free[rng.gen_range(0..free.len())],
        })
        .collect();

    for round in 0..options.rounds {
        for agent in agents.iter_mut() {
            let goal = free[rng.gen_range(0..free.len())];
            agent.tracker.begin(PathRequest::new(
                world_source.clone(),
                profile.clone(),
                agent.position,
                Goal::exact(goal),
            ));

            if rng.gen_bool(replan_rate) {
                let goal = free[rng.gen_range(0..free.len())];
                agent.tracker.begin(PathRequest::new(
                    world_source.clone(),
                    profile.clone(),
                    agent.position,
                    Goal::exact(goal),
                ));
                report.superseded += 1;
            }
        }

        let mut round_ticks = 0u64;
        loop {
            round_ticks += 1;
            let waiting = agents
                .iter_mut()
                .map(|agent| agent.tracker.tick().is_waiting())
                .filter(|waiting| *waiting)
                .count();
            if waiting == 0 {
                break;
            }
            std::thread::sleep(options.tick_interval);
        }
        report.ticks += round_ticks;

        for agent in agents.iter_mut() {
            let key = match agent.tracker.state() {
                TrackerState::Succeeded(plan) => {
                    report.total_cost += f64::from(plan.cost);
                    report.total_expansions += plan.expansions;
                    report.total_attempts += u64::from(plan.attempts);
                    if let Some(last) = plan.path.last() {
                        agent.position = last.to;
                    }
                    "success".to_string()
                }
                TrackerState::Failed(reason) => reason.to_string(),
                TrackerState::Idle | TrackerState::Waiting { .. } => continue,
            };
            *report.outcomes.entry(key).or_insert(0) += 1;
        }

        debug!(
            round,
            ticks = round_ticks,
            pending = service.pending(),
            "Round complete"
        );
    }

    report.duration = start.elapsed();
    info!(
        "Simulated {} agents for {} rounds: {}/{} paths in {} ticks",
        report.agents,
        report.rounds,
        report.successes(),
        report.requests(),
        report.ticks
    );
    report
}
