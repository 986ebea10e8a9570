//! gridplan CLI
//!
//! Thin command-line front end over the `gridplan` library.

use clap::Parser;
use gridplan::service::ShutdownToken;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("gridplan=debug")
    } else {
        EnvFilter::new("gridplan=warn")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let shutdown = ShutdownToken::new();
    let result = match cli.command {
        Commands::Plan(args) => cli::plan::execute(args, &cli.config, shutdown.clone()),
        Commands::Simulate(args) => cli::simulate::execute(args, &cli.config, shutdown.clone()),
        Commands::Init(args) => cli::init::execute(args, &cli.config),
        Commands::Schema => cli::schema::execute(),
    };

    // stop every worker pool before exiting
    shutdown.trigger();
    result
}
