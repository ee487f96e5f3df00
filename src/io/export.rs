use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{format_cents, Entry};

/// Header shared by CSV export and import.
pub const ENTRY_CSV_HEADER: [&str; 6] = ["id", "date", "kind", "category", "description", "amount"];

/// Full ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

/// Exporter for writing ledger entries to CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export all entries to CSV, newest first. Returns the row count.
    pub async fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.service.list_entries().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(ENTRY_CSV_HEADER)?;
        for entry in &entries {
            csv_writer.write_record([
                entry.id.to_string(),
                entry.date.format("%Y-%m-%d").to_string(),
                entry.kind.as_str().to_string(),
                entry.category.clone(),
                entry.description.clone(),
                format_cents(entry.amount_cents),
            ])?;
        }

        csv_writer.flush()?;
        Ok(entries.len())
    }

    /// Export all entries as a pretty-printed JSON snapshot.
    pub async fn export_entries_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            entries: self.service.list_entries().await?,
        };

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writeln!(writer)?;
        Ok(snapshot)
    }
}
