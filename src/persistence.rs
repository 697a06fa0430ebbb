//! Database persistence layer for txhistory
//!
//! One append-only `transactions` table, no key and no index. Repeated runs
//! against the same file append the same rows again.

use crate::error::{HistoryError, Result};
use crate::record::TransactionRecord;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::Mutex;

/// Abstraction over record storage backends
pub trait TransactionStore {
    /// Append every record; returns the number of rows written
    fn append(&self, records: &[TransactionRecord]) -> Result<usize>;
    /// Full scan in insertion order
    fn load_all(&self) -> Result<Vec<TransactionRecord>>;
    /// Full scan by ascending time, ties in insertion order
    fn load_by_time(&self) -> Result<Vec<TransactionRecord>>;
    fn count(&self) -> Result<usize>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| HistoryError::DatabaseError(format!("Failed to open database: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                to_address TEXT,
                from_address TEXT,
                value REAL,
                gas_cost REAL,
                time TIMESTAMP
            )",
            [],
        )
        .map_err(|e| {
            HistoryError::DatabaseError(format!("Failed to create transactions table: {}", e))
        })?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| HistoryError::DatabaseError("Mutex poisoned".to_string()))
    }

    fn query_records(&self, sql: &str) -> Result<Vec<TransactionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| HistoryError::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], record_from_row)
            .map_err(|e| HistoryError::DatabaseError(format!("Failed to query transactions: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(
                row.map_err(|e| HistoryError::DatabaseError(format!("Failed to read row: {}", e)))?,
            );
        }
        Ok(records)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let to: Option<String> = row.get(0)?;
    let from: Option<String> = row.get(1)?;
    let value: Option<f64> = row.get(2)?;
    let gas_cost: Option<f64> = row.get(3)?;
    let timestamp: DateTime<Utc> = row.get(4)?;

    Ok(TransactionRecord {
        to: to.unwrap_or_default(),
        from: from.unwrap_or_default(),
        value: value.unwrap_or_default(),
        gas_cost: gas_cost.unwrap_or_default(),
        timestamp,
    })
}

impl TransactionStore for Database {
    fn append(&self, records: &[TransactionRecord]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(|e| {
            HistoryError::DatabaseError(format!("Failed to start transaction: {}", e))
        })?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO transactions (to_address, from_address, value, gas_cost, time)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| HistoryError::DatabaseError(format!("Failed to prepare insert: {}", e)))?;

            for record in records {
                stmt.execute(params![
                    record.to,
                    record.from,
                    record.value,
                    record.gas_cost,
                    record.timestamp,
                ])
                .map_err(|e| HistoryError::DatabaseError(format!("Failed to save transaction: {}", e)))?;
            }
        }

        tx.commit().map_err(|e| {
            HistoryError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(records.len())
    }

    fn load_all(&self) -> Result<Vec<TransactionRecord>> {
        self.query_records(
            "SELECT to_address, from_address, value, gas_cost, time FROM transactions ORDER BY rowid",
        )
    }

    fn load_by_time(&self) -> Result<Vec<TransactionRecord>> {
        self.query_records(
            "SELECT to_address, from_address, value, gas_cost, time FROM transactions ORDER BY time, rowid",
        )
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .map_err(|e| HistoryError::DatabaseError(format!("Failed to count transactions: {}", e)))?;
        Ok(n as usize)
    }
}

/// In-memory store for tests and dry runs
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<TransactionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<TransactionRecord>>> {
        self.records
            .lock()
            .map_err(|_| HistoryError::DatabaseError("Mutex poisoned".to_string()))
    }
}

impl TransactionStore for InMemoryStore {
    fn append(&self, records: &[TransactionRecord]) -> Result<usize> {
        self.lock()?.extend_from_slice(records);
        Ok(records.len())
    }

    fn load_all(&self) -> Result<Vec<TransactionRecord>> {
        Ok(self.lock()?.clone())
    }

    fn load_by_time(&self) -> Result<Vec<TransactionRecord>> {
        let mut records = self.lock()?.clone();
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}
