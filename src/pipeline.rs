//! fetch -> store -> display -> plot for one address

use crate::aggregator::{Aggregator, ListingQuery};
use crate::balance::{final_balance, project_from_store};
use crate::chart;
use crate::config::Config;
use crate::error::Result;
use crate::explorer::{ExplorerClient, TransactionSource};
use crate::persistence::{Database, TransactionStore};
use crate::record::normalize_all;
use crate::report;
use tracing::{info, warn};

/// Address tracked when none is given on the command line
pub const DEFAULT_ADDRESS: &str =
    "0x5d1831d8e81e7897450685a302dbd7df0cd8349faca87722af0bcaa1d38b24a2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    None,
    Static,
    Interactive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Rows returned by the aggregator
    pub fetched: usize,
    /// Rows appended to the store by this run
    pub stored: usize,
    /// Balance after replaying the whole store
    pub final_balance: Option<f64>,
}

impl RunSummary {
    fn empty() -> Self {
        Self {
            fetched: 0,
            stored: 0,
            final_balance: None,
        }
    }
}

/// Fetch both listings and append the normalized rows to `store`.
/// Returns `(fetched, stored)`; nothing is written when the fetch is empty.
pub async fn sync_address<S, T>(
    source: &S,
    store: &T,
    config: &Config,
    address: &str,
) -> Result<(usize, usize)>
where
    S: TransactionSource,
    T: TransactionStore,
{
    let aggregator = Aggregator::new(source, ListingQuery::from(&config.api), &config.aggregation);
    let raw = aggregator.fetch_transactions(address).await;
    if raw.is_empty() {
        warn!("No transactions found or an error occurred for {}", address);
        return Ok((0, 0));
    }

    let records = normalize_all(&raw)?;
    let stored = store.append(&records)?;
    info!("Stored {} transactions for {}", stored, address);
    Ok((raw.len(), stored))
}

/// Sync, then print the table and the balance chart from `store`
pub async fn run_with<S, T>(
    source: &S,
    store: &T,
    config: &Config,
    address: &str,
    mode: ChartMode,
) -> Result<RunSummary>
where
    S: TransactionSource,
    T: TransactionStore,
{
    let (fetched, stored) = sync_address(source, store, config, address).await?;
    if stored == 0 {
        return Ok(RunSummary::empty());
    }

    println!("{}", report::render_transactions(store, config.display.table_style)?);

    let points = project_from_store(store)?;
    match mode {
        ChartMode::None => {}
        ChartMode::Static => println!(
            "{}",
            chart::render_to_string(&points, config.display.chart_width, config.display.chart_height)?
        ),
        ChartMode::Interactive => chart::show_interactive(&points)?,
    }

    Ok(RunSummary {
        fetched,
        stored,
        final_balance: Some(final_balance(&points)),
    })
}

/// Production entry point: live explorer client and the configured database
pub async fn run(config: &Config, address: &str, mode: ChartMode) -> Result<RunSummary> {
    if config.api.has_placeholder_key() {
        warn!("No explorer API key configured; requests will likely be rejected");
    }
    let client = ExplorerClient::new(&config.api)?;
    let db = Database::open(&config.database.path)?;
    run_with(&client, &db, config, address, mode).await
}
