//! CLI frontend for the Tickworld simulation kernel.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tw",
    about = "Tickworld: miners, soldiers, and goblins on a tick-driven grid",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the starting world comes from.
#[derive(Args)]
pub struct WorldArgs {
    /// Scenario JSON file (default: a generated world)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Width of a generated world
    #[arg(long, default_value = "20")]
    width: u32,

    /// Height of a generated world
    #[arg(long, default_value = "12")]
    height: u32,

    /// RNG seed for a generated world
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Ticks a killed occupant stays on the grid
    #[arg(long, default_value = "4")]
    corpse_ticks: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation and print a summary
    Simulate {
        #[command(flatten)]
        world: WorldArgs,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "50")]
        ticks: u64,

        /// Show all events (not just notable ones)
        #[arg(short, long)]
        verbose: bool,

        /// Draw the final grid
        #[arg(short, long)]
        map: bool,
    },

    /// Run the simulation and write occupant snapshots as JSON
    Export {
        #[command(flatten)]
        world: WorldArgs,

        /// Number of ticks to simulate before exporting
        #[arg(short, long, default_value = "0")]
        ticks: u64,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print an example scenario file
    Example {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            world,
            ticks,
            verbose,
            map,
        } => commands::simulate::run(&world, ticks, verbose, map),
        Commands::Export {
            world,
            ticks,
            output,
        } => commands::export::run(&world, ticks, output.as_deref()),
        Commands::Example { output } => commands::example::run(output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
