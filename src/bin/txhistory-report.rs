#![forbid(unsafe_code)]
//! Print the stored transactions as a table

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use txhistory::config::load_config;
use txhistory::persistence::{Database, TransactionStore};
use txhistory::report;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides database.path
    #[arg(long)]
    db: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    txhistory::init_logging();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.override_db_path(cli.db)?;
    let db = Database::open(&config.database.path)?;

    if db.count()? == 0 {
        println!("{}", format!("📭 No transactions stored in {}", config.database.path).yellow());
        return Ok(());
    }

    println!("{}", report::render_transactions(&db, config.display.table_style)?);
    println!("{}", format!("📝 Total Transactions: {}", db.count()?).blue());

    Ok(())
}
