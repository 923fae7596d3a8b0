//! Headless delve runner.
//!
//! ```text
//! delve run --maps maps --start hall --script scripts/walk_and_shoot.json
//! delve inspect --maps maps --map cellar --format json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod script;

#[derive(Parser)]
#[command(name = "delve")]
#[command(about = "Run and inspect delve maps without an engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive a game from a map directory and an input script
    Run(commands::run::Run),
    /// Print what a map generates
    Inspect(commands::inspect::Inspect),
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Inspect(cmd) => cmd.execute(),
    }
}
