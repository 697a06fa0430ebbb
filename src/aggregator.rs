//! Fetches the normal and internal listings for one address and merges them
//! into a single time-ordered sequence.

use crate::config::{AggregationConfig, ApiConfig};
use crate::explorer::TransactionSource;
use crate::record::{RawTransaction, TxKind};
use tracing::{error, info, warn};

pub const ACCOUNT_MODULE: &str = "account";

/// Query parameters shared by both listings: whole block range, one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub start_block: u64,
    pub end_block: u64,
    pub page: u32,
    pub offset: u32,
    pub sort: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ListingQuery {
    fn from(config: &ApiConfig) -> Self {
        Self {
            start_block: config.start_block,
            end_block: config.end_block,
            page: 1,
            offset: config.page_size,
            sort: config.sort.clone(),
        }
    }
}

impl ListingQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startblock", self.start_block.to_string()),
            ("endblock", self.end_block.to_string()),
            ("page", self.page.to_string()),
            ("offset", self.offset.to_string()),
            ("sort", self.sort.clone()),
        ]
    }
}

pub struct Aggregator<'a, S: TransactionSource> {
    source: &'a S,
    query: ListingQuery,
    require_both: bool,
}

impl<'a, S: TransactionSource> Aggregator<'a, S> {
    pub fn new(source: &'a S, query: ListingQuery, policy: &AggregationConfig) -> Self {
        Self {
            source,
            query,
            require_both: policy.require_both_categories,
        }
    }

    /// One listing; a failed call is logged and counts as an empty listing
    async fn fetch_kind(&self, kind: TxKind, address: &str) -> Vec<RawTransaction> {
        let params = self.query.params();
        match self
            .source
            .fetch_list(ACCOUNT_MODULE, kind.action(), address, &params)
            .await
        {
            Ok(items) => {
                info!("Fetched {} {} transactions for {}", items.len(), kind, address);
                items
                    .into_iter()
                    .map(|body| RawTransaction::new(kind, body))
                    .collect()
            }
            Err(e) => {
                warn!("Fetching {} transactions failed ({}): {}", kind, e.kind(), e);
                Vec::new()
            }
        }
    }

    /// Normal then internal listing, merged and sorted by `timeStamp`.
    ///
    /// With the default policy an empty listing on either side discards the
    /// whole result.
    pub async fn fetch_transactions(&self, address: &str) -> Vec<RawTransaction> {
        let normal = self.fetch_kind(TxKind::Normal, address).await;
        let internal = self.fetch_kind(TxKind::Internal, address).await;

        if self.require_both && (normal.is_empty() || internal.is_empty()) {
            error!(
                "Failed to fetch transactions for {} (normal: {}, internal: {})",
                address,
                normal.len(),
                internal.len()
            );
            return Vec::new();
        }

        merge_by_timestamp(normal, internal)
    }
}

/// Concatenate and stable-sort by ascending epoch timestamp
pub fn merge_by_timestamp(
    first: Vec<RawTransaction>,
    second: Vec<RawTransaction>,
) -> Vec<RawTransaction> {
    let mut merged = first;
    merged.extend(second);
    merged.sort_by_key(RawTransaction::sort_key);
    merged
}
