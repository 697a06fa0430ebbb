//! Tabular view of stored transactions

use crate::config::TableStyle;
use crate::error::Result;
use crate::persistence::TransactionStore;
use crate::record::TransactionRecord;
use chrono::{DateTime, Utc};
use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

pub const HEADERS: [&str; 5] = ["To Address", "From Address", "Value", "Gas Cost", "Time"];

/// Fixed 8 decimal places, as shown in the Value and Gas Cost columns
pub fn format_amount(amount: f64) -> String {
    format!("{:.8}", amount)
}

pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn build_table(records: &[TransactionRecord], style: TableStyle) -> Table {
    let mut table = Table::new();
    table
        .load_preset(match style {
            TableStyle::Grid => ASCII_FULL,
            TableStyle::Utf8 => UTF8_FULL,
        })
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(
            HEADERS
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );

    for record in records {
        table.add_row(vec![
            Cell::new(&record.to),
            Cell::new(&record.from),
            Cell::new(format_amount(record.value)).set_alignment(CellAlignment::Right),
            Cell::new(format_amount(record.gas_cost)).set_alignment(CellAlignment::Right),
            Cell::new(format_time(&record.timestamp)),
        ]);
    }

    table
}

/// Read every stored record and render it; the store is not modified
pub fn render_transactions<S: TransactionStore>(store: &S, style: TableStyle) -> Result<String> {
    let records = store.load_all()?;
    Ok(build_table(&records, style).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryStore;

    fn record() -> TransactionRecord {
        TransactionRecord {
            to: "0xbob".to_string(),
            from: "0xalice".to_string(),
            value: 2.5,
            gas_cost: 0.00105,
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2.5), "2.50000000");
        assert_eq!(format_amount(0.00105), "0.00105000");
        assert_eq!(format_amount(0.0), "0.00000000");
    }

    #[test]
    fn test_format_time() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(format_time(&ts), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_table_contains_headers_and_values() {
        let store = InMemoryStore::new();
        store.append(&[record()]).unwrap();
        let rendered = render_transactions(&store, TableStyle::Grid).unwrap();

        for header in HEADERS {
            assert!(rendered.contains(header), "missing header {}", header);
        }
        assert!(rendered.contains("0xbob"));
        assert!(rendered.contains("0xalice"));
        assert!(rendered.contains("2.50000000"));
        assert!(rendered.contains("0.00105000"));
        assert!(rendered.contains("2023-11-14 22:13:20"));
        assert!(rendered.starts_with('+'));
    }

    #[test]
    fn test_empty_store_renders_header_only() {
        let store = InMemoryStore::new();
        let table = build_table(&store.load_all().unwrap(), TableStyle::Utf8);
        assert_eq!(table.row_iter().count(), 0);
        assert!(table.to_string().contains("Gas Cost"));
    }
}
