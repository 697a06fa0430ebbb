#![forbid(unsafe_code)]
//! Plot the running balance of the stored transactions

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use txhistory::balance::{final_balance, project_from_store};
use txhistory::chart;
use txhistory::config::load_config;
use txhistory::persistence::Database;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides database.path
    #[arg(long)]
    db: Option<String>,

    /// Show the chart full screen (quit with q)
    #[arg(short, long)]
    interactive: bool,

    /// Chart width in columns, overrides display.chart_width
    #[arg(long)]
    width: Option<u16>,

    /// Chart height in rows, overrides display.chart_height
    #[arg(long)]
    height: Option<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    txhistory::init_logging();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.override_db_path(cli.db)?;
    let db = Database::open(&config.database.path)?;

    let points = project_from_store(&db)?;
    if points.is_empty() {
        println!("{}", format!("📭 No transactions stored in {}", config.database.path).yellow());
        return Ok(());
    }

    if cli.interactive {
        chart::show_interactive(&points)?;
    } else {
        let width = cli.width.unwrap_or(config.display.chart_width);
        let height = cli.height.unwrap_or(config.display.chart_height);
        println!("{}", chart::render_to_string(&points, width, height)?);
    }

    println!(
        "{}",
        format!("📊 Final balance: {:.8}", final_balance(&points)).bright_blue().bold()
    );

    Ok(())
}
