#![forbid(unsafe_code)]
//! Fetch an address's transactions, store them, then show the table and balance chart

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use txhistory::config::load_config;
use txhistory::pipeline::{self, ChartMode, DEFAULT_ADDRESS};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address whose history is fetched
    #[arg(default_value = DEFAULT_ADDRESS)]
    address: String,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides database.path
    #[arg(long)]
    db: Option<String>,

    /// Skip the balance chart
    #[arg(long, conflicts_with = "interactive")]
    no_chart: bool,

    /// Show the chart full screen instead of printing it
    #[arg(short, long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    txhistory::init_logging();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.override_db_path(cli.db)?;

    let mode = if cli.no_chart {
        ChartMode::None
    } else if cli.interactive {
        ChartMode::Interactive
    } else {
        ChartMode::Static
    };

    println!("{}", format!("📜 Transaction history for {}", cli.address).bright_cyan().bold());
    println!();

    let summary = pipeline::run(&config, &cli.address, mode).await?;

    if summary.stored == 0 {
        println!("{}", "📭 No transactions found or an error occurred.".yellow());
        return Ok(());
    }

    println!("{}", format!("📥 Fetched: {}", summary.fetched).green());
    println!("{}", format!("💾 Stored:  {} ({})", summary.stored, config.database.path).green());
    if let Some(balance) = summary.final_balance {
        println!("{}", format!("📊 Balance: {:.8}", balance).bright_blue().bold());
    }

    Ok(())
}
