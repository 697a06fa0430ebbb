//! txhistory - transaction history, table and balance chart for an Ethereum address
//!
//! # Architecture
//!
//! ## Fetching
//! - [`explorer`] - Block-explorer API client and the `TransactionSource` seam
//! - [`aggregator`] - Normal + internal listings merged in time order
//! - [`record`] - Raw rows and normalized `TransactionRecord`s
//!
//! ## Storage
//! - [`persistence`] - Append-only SQLite table and in-memory store
//!
//! ## Output
//! - [`report`] - Grid table of stored transactions
//! - [`balance`] - Running balance projection
//! - [`chart`] - Terminal line chart
//!
//! ## Orchestration & Utilities
//! - [`pipeline`] - fetch, store, display, plot
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Fetching
// ============================================================================
pub mod aggregator;
pub mod explorer;
pub mod record;

// ============================================================================
// Storage
// ============================================================================
pub mod persistence;

// ============================================================================
// Output
// ============================================================================
pub mod balance;
pub mod chart;
pub mod report;

// ============================================================================
// Orchestration & Utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod pipeline;

/// Install the `tracing` subscriber used by the binaries (`RUST_LOG`, default `info`)
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
