pub mod init;
pub mod plan;
pub mod schema;
pub mod simulate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use gridplan::config::Config;
use gridplan::error::GridplanError;
use gridplan::world::{load_map, Cell, MapFile};

#[derive(Parser)]
#[command(name = "gridplan")]
#[command(
    author,
    version,
    about = "Voxel path planning on a shared pool of worker threads"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (defaults are used when it does not exist)
    #[arg(short, long, global = true, default_value = "gridplan.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan a single path over a map
    Plan(PlanArgs),

    /// Run many agents replanning against one planning service
    Simulate(SimulateArgs),

    /// Write the default config file
    Init(InitArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct PlanArgs {
    /// Text map file
    #[arg(short, long)]
    pub map: PathBuf,

    /// Start cell as x,y or x,y,z (overrides the map's `S`)
    #[arg(long)]
    pub start: Option<Cell>,

    /// Goal cell as x,y or x,y,z (overrides the map's `G`)
    #[arg(long)]
    pub goal: Option<Cell>,

    /// Stop next to the goal instead of on it
    #[arg(long, conflicts_with = "within")]
    pub adjacent: bool,

    /// Stop within this Manhattan distance of the goal
    #[arg(long)]
    pub within: Option<u32>,

    /// Heuristic weight (>= 1); higher is faster but less optimal
    #[arg(long)]
    pub weight: Option<f32>,

    /// Override the expansion cap
    #[arg(long)]
    pub max_expansions: Option<usize>,

    /// Override worker thread count
    #[arg(long)]
    pub threads: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Clone)]
pub struct SimulateArgs {
    /// Text map file
    #[arg(short, long)]
    pub map: PathBuf,

    /// Number of agents
    #[arg(long, default_value_t = 8)]
    pub agents: usize,

    /// Number of rounds; each agent asks for one path per round
    #[arg(long, default_value_t = 4)]
    pub rounds: usize,

    /// Override worker thread count
    #[arg(long)]
    pub threads: Option<usize>,

    /// Random seed for agent placement and goals
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Chance an agent replans right after asking, superseding its request
    #[arg(long, default_value_t = 0.1)]
    pub replan_rate: f64,

    /// Write summary.json and summary.md into this directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    /// Where to write the config (defaults to --config)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Load and validate the config, using defaults when the file is missing
pub fn load_config(path: &Path, threads: Option<usize>) -> Result<Config, GridplanError> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        debug!("Config file {} not found, using defaults", path.display());
        Config::default()
    };

    if let Some(threads) = threads {
        config.service.threads = threads;
    }
    config.validate()?;
    Ok(config)
}

pub fn load_world(path: &Path) -> Result<MapFile, GridplanError> {
    let map = load_map(path)?;
    debug!(
        "Loaded {}x{}x{} map from {}",
        map.grid.width(),
        map.grid.depth(),
        map.grid.height(),
        path.display()
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridplan::error::ConfigError;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml"), Some(2)).unwrap();
        assert_eq!(config.service.threads, 2);
        assert_eq!(config.planner.max_expansions, Config::default().planner.max_expansions);
    }

    #[test]
    fn test_thread_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.yaml"), Some(0)).unwrap_err();
        assert!(matches!(
            err,
            GridplanError::Config(ConfigError::Invalid {
                field: "service.threads",
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parses_plan() {
        let cli = Cli::parse_from([
            "gridplan", "plan", "--map", "arena.txt", "--goal", "3,4", "--adjacent", "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("gridplan.yaml"));
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.goal, Some(Cell::new(3, 4, 0)));
                assert!(args.adjacent);
                assert!(args.start.is_none());
            }
            _ => panic!("expected plan"),
        }
    }
}
