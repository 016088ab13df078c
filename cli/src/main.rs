//! Reward stream CLI
//!
//! Reads vault/account snapshots written by the vault poller and shows the
//! vesting tranches, claimable amounts and boost of one account, either once
//! or continuously.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod boost;
mod clock;
mod config;
mod price;
mod scheduler;
mod snapshot;
mod streams;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "rewardstream")]
#[command(about = "Reward stream accounting - vesting tranches, claims and boost", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/rewardstream/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot file (overrides config)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show reward streams once
    Show {
        /// Evaluate at this unix time instead of now
        #[arg(long)]
        at: Option<u64>,
    },

    /// Recompute reward streams every tick
    Watch {
        /// Tick interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Export chart samples as JSON
    Chart {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Evaluate at this unix time instead of now
        #[arg(long)]
        at: Option<u64>,
    },

    /// Project streams forward assuming the current reward rate continues
    Preview {
        /// Seconds ahead
        #[arg(long, default_value = "86400")]
        horizon: u64,

        /// Project from this unix time instead of now
        #[arg(long)]
        at: Option<u64>,
    },

    /// Compute a boost multiplier
    Boost {
        /// Raw staked balance (decimal)
        #[arg(long)]
        staked: String,

        /// Locked governance balance (decimal)
        #[arg(long)]
        locked: String,

        /// Use the default coefficients of this curve instead of the snapshot's
        #[arg(long, value_enum)]
        curve: Option<boost::CurveKind>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(snapshot) = cli.snapshot {
        config.snapshot_path = snapshot;
    }

    if cli.verbose {
        println!("{} {}", "Snapshot:".bright_cyan(), config.snapshot_path.display());
        if let Some(price) = &config.price_path {
            println!("{} {}", "Prices:".bright_cyan(), price.display());
        }
    }

    match cli.command {
        Commands::Show { at } => {
            streams::show(&config, at)?;
        }
        Commands::Watch { interval, ticks } => {
            streams::watch(&config, interval, ticks).await?;
        }
        Commands::Chart { out, at } => {
            streams::chart(&config, out, at)?;
        }
        Commands::Preview { horizon, at } => {
            streams::preview(&config, horizon, at)?;
        }
        Commands::Boost { staked, locked, curve } => {
            boost::calculate(&config, &staked, &locked, curve)?;
        }
    }

    Ok(())
}
