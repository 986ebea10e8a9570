use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{load_config, load_world, SimulateArgs};
use gridplan::error::GridplanError;
use gridplan::output::{write_summary, SummaryContext};
use gridplan::pathing::PlanningService;
use gridplan::service::ShutdownToken;
use gridplan::simulation::{run_simulation, SimulationOptions};

pub fn execute(args: SimulateArgs, config_path: &Path, shutdown: ShutdownToken) -> anyhow::Result<()> {
    let config = load_config(config_path, args.threads)?;
    let map = load_world(&args.map)?;

    if !(0.0..=1.0).contains(&args.replan_rate) {
        anyhow::bail!("--replan-rate must be between 0 and 1, got {}", args.replan_rate);
    }

    let service = PlanningService::from_config(&config, shutdown)?;
    info!(
        "Simulating {} agents for {} rounds on {} worker threads",
        args.agents,
        args.rounds,
        service.active_workers()
    );

    let options = SimulationOptions {
        agents: args.agents,
        rounds: args.rounds,
        seed: args.seed,
        replan_rate: args.replan_rate,
        ..SimulationOptions::default()
    };
    let report = run_simulation(
        &service,
        Arc::new(map.grid),
        Arc::new(config.profile.clone()),
        &config.tracker,
        &options,
    );

    println!(
        "{} agents, {} rounds, {} ticks in {:.2}s",
        report.agents,
        report.rounds,
        report.ticks,
        report.duration.as_secs_f64()
    );
    for (outcome, count) in &report.outcomes {
        println!("  {:<24} {}", outcome, count);
    }
    println!("  {:<24} {}", "superseded", report.superseded);

    if let Some(report_dir) = &args.report_dir {
        let context = SummaryContext {
            map: &args.map,
            seed: args.seed,
            threads: config.service.threads,
        };
        let (json_path, md_path) =
            write_summary(report_dir, &report, &context).map_err(GridplanError::from)?;
        println!("Summary: {} ({})", md_path.display(), json_path.display());
    }

    Ok(())
}
