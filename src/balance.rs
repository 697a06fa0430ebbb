//! Running balance over stored transactions

use crate::error::Result;
use crate::persistence::TransactionStore;
use crate::record::TransactionRecord;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancePoint {
    pub timestamp: DateTime<Utc>,
    pub balance: f64,
}

/// Left fold of `value - gas_cost` over `records` in the given order, starting
/// from zero. Every record counts the same way whether the tracked address
/// sent or received it.
pub fn project_balance(records: &[TransactionRecord]) -> Vec<BalancePoint> {
    records
        .iter()
        .scan(0.0_f64, |balance, record| {
            *balance += record.net_value();
            Some(BalancePoint {
                timestamp: record.timestamp,
                balance: *balance,
            })
        })
        .collect()
}

/// Replay the store in time order
pub fn project_from_store<S: TransactionStore>(store: &S) -> Result<Vec<BalancePoint>> {
    let records = store.load_by_time()?;
    Ok(project_balance(&records))
}

pub fn final_balance(points: &[BalancePoint]) -> f64 {
    points.last().map(|p| p.balance).unwrap_or(0.0)
}
