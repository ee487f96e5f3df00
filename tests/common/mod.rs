// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use caja::application::LedgerService;
use caja::domain::{Entry, EntryDraft, EntryKind};
use chrono::NaiveDate;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Path of the database file inside a test directory
pub fn db_path(temp_dir: &TempDir) -> String {
    temp_dir.path().join("test.db").to_str().unwrap().to_string()
}

/// Helper to parse a YYYY-MM-DD string
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn income(description: &str, category: &str, amount_cents: i64, on: &str) -> EntryDraft {
    EntryDraft::new(EntryKind::Income, description, category, amount_cents, date(on))
}

pub fn expense(description: &str, category: &str, amount_cents: i64, on: &str) -> EntryDraft {
    EntryDraft::new(EntryKind::Expense, description, category, amount_cents, date(on))
}

/// Test fixture: a few days of typical activity
pub struct SampleLedger;

impl SampleLedger {
    /// Salary and lunch on 2024-03-01, bus ticket and a sale on 2024-03-02,
    /// groceries on 2024-02-28.
    pub async fn create(service: &LedgerService) -> Result<Vec<Entry>> {
        let drafts = [
            income("Salary", "Salary", 100000, "2024-03-01"),
            expense("Lunch", "Food", 1550, "2024-03-01"),
            expense("Bus ticket", "Transport", 275, "2024-03-02"),
            income("Old bike", "Sale", 4000, "2024-03-02"),
            expense("Groceries", "Shopping", 6320, "2024-02-28"),
        ];

        let mut entries = Vec::new();
        for draft in drafts {
            entries.push(service.record_entry(draft).await?);
        }
        Ok(entries)
    }
}
