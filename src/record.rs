//! Transaction types: raw explorer rows and normalized ledger records

use crate::error::{HistoryError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use std::fmt;

/// Wei per ether
pub const WEI_PER_ETHER: f64 = 1e18;

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// Which explorer listing a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Normal,
    Internal,
}

impl TxKind {
    /// Explorer `action` parameter for this listing
    pub fn action(&self) -> &'static str {
        match self {
            TxKind::Normal => "txlist",
            TxKind::Internal => "txlistinternal",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TxKind::Normal => write!(f, "normal"),
            TxKind::Internal => write!(f, "internal"),
        }
    }
}

/// One undecoded row of an explorer `result` list
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    pub kind: TxKind,
    pub body: Value,
}

impl RawTransaction {
    pub fn new(kind: TxKind, body: Value) -> Self {
        Self { kind, body }
    }

    /// String view of a field; explorers send numbers as strings but a bare
    /// JSON number is accepted too.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.body.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.body.get(name).is_some()
    }

    /// Epoch seconds used for ordering; absent or unparseable is 0
    pub fn sort_key(&self) -> i64 {
        self.field("timeStamp")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }

    fn integer_field(&self, name: &str) -> Result<u128> {
        match self.field(name) {
            None => Ok(0),
            Some(s) if s.trim().is_empty() => Ok(0),
            Some(s) => s.trim().parse::<u128>().map_err(|e| {
                HistoryError::InvalidRecord(format!(
                    "{} field '{}' = {:?} is not an integer: {}",
                    self.kind, name, s, e
                ))
            }),
        }
    }
}

/// Convert an amount in wei to ether
pub fn wei_to_ether(wei: u128) -> f64 {
    wei as f64 / WEI_PER_ETHER
}

/// Fee paid for a row. Normal transactions carry `gasPrice`; internal ones
/// do not, in which case `gasUsed` alone is scaled.
pub fn gas_cost(gas_used: u128, gas_price: Option<u128>) -> f64 {
    match gas_price {
        Some(price) => wei_to_ether(gas_used.saturating_mul(price)),
        None => wei_to_ether(gas_used),
    }
}

/// A normalized ledger entry as stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub to: String,
    pub from: String,
    pub value: f64,
    pub gas_cost: f64,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn from_raw(raw: &RawTransaction) -> Result<Self> {
        let value = wei_to_ether(raw.integer_field("value")?);
        let gas_used = raw.integer_field("gasUsed")?;
        let gas_price = if raw.has_field("gasPrice") {
            Some(raw.integer_field("gasPrice")?)
        } else {
            None
        };

        let secs = match raw.field("timeStamp") {
            None => 0,
            Some(s) => s.trim().parse::<i64>().map_err(|e| {
                HistoryError::InvalidRecord(format!("timeStamp {:?} is not an integer: {}", s, e))
            })?,
        };
        let timestamp = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            HistoryError::InvalidRecord(format!("timeStamp {} is out of range", secs))
        })?;
        // stored as text; only four-digit years keep `ORDER BY time` chronological
        if !(MIN_YEAR..=MAX_YEAR).contains(&timestamp.year()) {
            return Err(HistoryError::InvalidRecord(format!(
                "timeStamp {} falls outside years {}-{}",
                secs, MIN_YEAR, MAX_YEAR
            )));
        }

        Ok(Self {
            to: raw.field("to").unwrap_or_default(),
            from: raw.field("from").unwrap_or_default(),
            value,
            gas_cost: gas_cost(gas_used, gas_price),
            timestamp,
        })
    }

    /// Net change this record applies to the running balance
    pub fn net_value(&self) -> f64 {
        self.value - self.gas_cost
    }
}

/// Normalize an aggregated batch, preserving order
pub fn normalize_all(raw: &[RawTransaction]) -> Result<Vec<TransactionRecord>> {
    raw.iter().map(TransactionRecord::from_raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_conversion() {
        assert_eq!(wei_to_ether(2_500_000_000_000_000_000), 2.5);
    }

    #[test]
    fn test_gas_cost_with_price() {
        assert_eq!(gas_cost(21_000, Some(50_000_000_000)), 0.00105);
    }

    #[test]
    fn test_normal_transaction() {
        let raw = RawTransaction::new(
            TxKind::Normal,
            json!({
                "to": "0xbob",
                "from": "0xalice",
                "value": "2500000000000000000",
                "gasUsed": "21000",
                "gasPrice": "50000000000",
                "timeStamp": "1700000000"
            }),
        );
        let record = TransactionRecord::from_raw(&raw).unwrap();
        assert_eq!(record.to, "0xbob");
        assert_eq!(record.from, "0xalice");
        assert_eq!(record.value, 2.5);
        assert_eq!(record.gas_cost, 0.00105);
        assert_eq!(record.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_internal_transaction_without_gas_price() {
        let raw = RawTransaction::new(
            TxKind::Internal,
            json!({
                "to": "",
                "from": "0xcontract",
                "value": "1000000000000000000",
                "gasUsed": "2300",
                "timeStamp": "100"
            }),
        );
        let record = TransactionRecord::from_raw(&raw).unwrap();
        assert_eq!(record.to, "");
        assert_eq!(record.value, 1.0);
        assert_eq!(record.gas_cost, 2300.0 / 1e18);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let raw = RawTransaction::new(TxKind::Internal, json!({}));
        let record = TransactionRecord::from_raw(&raw).unwrap();
        assert_eq!(record.value, 0.0);
        assert_eq!(record.gas_cost, 0.0);
        assert_eq!(record.timestamp.timestamp(), 0);
        assert!(record.from.is_empty());
    }

    #[test]
    fn test_numeric_json_fields_accepted() {
        let raw = RawTransaction::new(
            TxKind::Normal,
            json!({"value": 1000000000000000000u64, "timeStamp": 42}),
        );
        assert_eq!(raw.sort_key(), 42);
        assert_eq!(TransactionRecord::from_raw(&raw).unwrap().value, 1.0);
    }

    #[test]
    fn test_non_integer_value_is_invalid() {
        let raw = RawTransaction::new(TxKind::Normal, json!({"value": "1.5"}));
        let err = TransactionRecord::from_raw(&raw).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidRecord(_)));
    }

    #[test]
    fn test_five_digit_year_is_invalid() {
        // 10000-01-01T00:00:00Z
        let raw = RawTransaction::new(TxKind::Normal, json!({"timeStamp": "253402300800"}));
        let err = TransactionRecord::from_raw(&raw).unwrap_err();
        assert!(matches!(err, HistoryError::InvalidRecord(_)));

        let last = RawTransaction::new(TxKind::Normal, json!({"timeStamp": "253402300799"}));
        assert_eq!(TransactionRecord::from_raw(&last).unwrap().timestamp.year(), 9999);
    }

    #[test]
    fn test_negative_year_is_invalid() {
        let raw = RawTransaction::new(TxKind::Normal, json!({"timeStamp": "-62167219201"}));
        assert!(matches!(
            TransactionRecord::from_raw(&raw),
            Err(HistoryError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_sort_key_defaults_to_zero() {
        let raw = RawTransaction::new(TxKind::Normal, json!({"timeStamp": "soon"}));
        assert_eq!(raw.sort_key(), 0);
    }
}
