//! Flight Surety Simulator CLI
//!
//! Runs a full insurance scenario against an in-process ledger with
//! simulated oracles answering every status request.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use surety_simulator::{run_scenario, SimulatorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "surety-sim")]
#[command(about = "Oracle response simulator for the flight surety ledger")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario and print a settlement report
    Run {
        /// TOML configuration file; defaults apply to anything it omits
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::DefaultConfig => {
            // No tracing here: output goes to stdout
            print!("{}", SimulatorConfig::default().to_toml()?);
        }

        Commands::Run { config, seed } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .init();

            let mut config = match config {
                Some(path) => SimulatorConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => SimulatorConfig::default(),
            };
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }

            let report = run_scenario(config).await.context("scenario failed")?;
            report.print();
        }
    }

    Ok(())
}
