use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::warn;

use crate::domain::{
    cents_from_real, cents_to_real, DailySummary, DayReport, Entry, EntryDraft, EntryId,
    EntryKind, LedgerTotals,
};

use super::{MIGRATION_001_MOVIMIENTOS, SCHEMA_VERSION};

const DATE_FORMAT: &str = "%Y-%m-%d";

const ENTRY_COLUMNS: &str = "id, kind, description, category, amount, date";

/// Repository for persisting and querying ledger entries.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    // ========================
    // Schema lifecycle
    // ========================

    /// Create the entries table if absent. Idempotent.
    ///
    /// A fresh database (user_version 0) is stamped with [`SCHEMA_VERSION`].
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_MOVIMIENTOS)
            .execute(&self.pool)
            .await
            .context("Failed to create entries table")?;

        if self.schema_version().await? == 0 {
            self.set_schema_version(SCHEMA_VERSION).await?;
        }
        Ok(())
    }

    /// Drop and recreate the entries table, then stamp `new_version`.
    ///
    /// Every stored entry is discarded. Returns how many rows were lost.
    pub async fn upgrade(&self, old_version: i64, new_version: i64) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin upgrade transaction")?;

        let table_exists: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = 'movimientos'",
        )
        .fetch_one(&mut *tx)
        .await
        .context("Failed to inspect schema")?
        .get("count");

        let discarded: i64 = if table_exists > 0 {
            sqlx::query("SELECT COUNT(*) AS count FROM movimientos")
                .fetch_one(&mut *tx)
                .await
                .context("Failed to count entries before upgrade")?
                .get("count")
        } else {
            0
        };

        sqlx::query("DROP TABLE IF EXISTS movimientos")
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "Failed to drop entries table (upgrade {} -> {})",
                    old_version, new_version
                )
            })?;

        sqlx::query(MIGRATION_001_MOVIMIENTOS)
            .execute(&mut *tx)
            .await
            .context("Failed to recreate entries table")?;

        // PRAGMA does not take bound parameters
        sqlx::query(&format!("PRAGMA user_version = {}", new_version))
            .execute(&mut *tx)
            .await
            .context("Failed to stamp schema version")?;

        tx.commit().await.context("Failed to commit upgrade")?;

        Ok(discarded as u64)
    }

    /// The version recorded in `PRAGMA user_version` (0 for a fresh file).
    pub async fn schema_version(&self) -> Result<i64> {
        let row = sqlx::query("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read schema version")?;
        Ok(row.get("user_version"))
    }

    async fn set_schema_version(&self, version: i64) -> Result<()> {
        sqlx::query(&format!("PRAGMA user_version = {}", version))
            .execute(&self.pool)
            .await
            .context("Failed to stamp schema version")?;
        Ok(())
    }

    // ========================
    // Entry operations
    // ========================

    /// Insert a new entry and return it with its assigned id.
    pub async fn insert_entry(&self, draft: EntryDraft) -> Result<Entry> {
        let result = sqlx::query(
            r#"
            INSERT INTO movimientos (kind, description, category, amount, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.kind.as_str())
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(cents_to_real(draft.amount_cents))
        .bind(draft.date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .context("Failed to insert entry")?;

        Ok(Entry::from_draft(result.last_insert_rowid(), draft))
    }

    /// Get an entry by id.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM movimientos WHERE id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch entry")?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    /// List every entry, newest date first.
    pub async fn list_entries(&self) -> Result<Vec<Entry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM movimientos ORDER BY date DESC, id DESC",
            ENTRY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list entries")?;

        Ok(decode_entries(&rows))
    }

    /// Entries whose description or category contains `needle`
    /// (ASCII case-insensitive), newest date first.
    pub async fn search_entries(&self, needle: &str) -> Result<Vec<Entry>> {
        let pattern = like_pattern(needle);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM movimientos
            WHERE description LIKE ? ESCAPE '\' OR category LIKE ? ESCAPE '\'
            ORDER BY date DESC, id DESC
            "#,
            ENTRY_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search entries")?;

        Ok(decode_entries(&rows))
    }

    /// Entries recorded on exactly `date`, newest id first.
    pub async fn list_entries_by_date(&self, date: NaiveDate) -> Result<Vec<Entry>> {
        fetch_entries_on(&self.pool, date).await
    }

    /// Aggregate income and expense for one date.
    pub async fn summarize_date(&self, date: NaiveDate) -> Result<DailySummary> {
        fetch_summary(&self.pool, date).await
    }

    /// Summary and entries of one date, read in a single transaction.
    pub async fn day_report(&self, date: NaiveDate) -> Result<DayReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin read transaction")?;

        let summary = fetch_summary(&mut *tx, date).await?;
        let entries = fetch_entries_on(&mut *tx, date).await?;

        tx.commit()
            .await
            .context("Failed to finish read transaction")?;

        Ok(DayReport { summary, entries })
    }

    /// All-time totals across the table.
    pub async fn totals(&self) -> Result<LedgerTotals> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS entry_count,
                COALESCE(SUM(CASE WHEN kind = 'Income' THEN CAST(ROUND(amount * 100) AS INTEGER) ELSE 0 END), 0) AS total_income,
                COALESCE(SUM(CASE WHEN kind <> 'Income' THEN CAST(ROUND(amount * 100) AS INTEGER) ELSE 0 END), 0) AS total_expense
            FROM movimientos
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute totals")?;

        Ok(LedgerTotals::new(
            row.get("entry_count"),
            row.get("total_income"),
            row.get("total_expense"),
        ))
    }

    /// Replace every field of entry `id`. Returns the number of rows touched.
    pub async fn update_entry(&self, id: EntryId, draft: &EntryDraft) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE movimientos
            SET kind = ?, description = ?, category = ?, amount = ?, date = ?
            WHERE id = ?
            "#,
        )
        .bind(draft.kind.as_str())
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(cents_to_real(draft.amount_cents))
        .bind(draft.date.format(DATE_FORMAT).to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update entry")?;

        Ok(result.rows_affected())
    }

    /// Delete entry `id`. Returns the number of rows touched.
    pub async fn delete_entry(&self, id: EntryId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM movimientos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected())
    }

    fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
        let id: EntryId = row.get("id");
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");
        let amount: f64 = row.get("amount");

        Ok(Entry {
            id,
            kind: kind_str
                .parse::<EntryKind>()
                .map_err(|e| anyhow::anyhow!("Entry {}: {}", id, e))?,
            description: row.get("description"),
            category: row.get("category"),
            amount_cents: cents_from_real(amount),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Entry {}: invalid date '{}'", id, date_str))?,
        })
    }
}

async fn fetch_summary<'e, E>(executor: E, date: NaiveDate) -> Result<DailySummary>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    // Anything not stored as exactly 'Income' counts as expense.
    let row = sqlx::query(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN kind = 'Income' THEN CAST(ROUND(amount * 100) AS INTEGER) ELSE 0 END), 0) AS total_income,
            COALESCE(SUM(CASE WHEN kind <> 'Income' THEN CAST(ROUND(amount * 100) AS INTEGER) ELSE 0 END), 0) AS total_expense
        FROM movimientos
        WHERE date = ?
        "#,
    )
    .bind(date.format(DATE_FORMAT).to_string())
    .fetch_one(executor)
    .await
    .context("Failed to summarize date")?;

    Ok(DailySummary::new(
        date,
        row.get("total_income"),
        row.get("total_expense"),
    ))
}

async fn fetch_entries_on<'e, E>(executor: E, date: NaiveDate) -> Result<Vec<Entry>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(&format!(
        "SELECT {} FROM movimientos WHERE date = ? ORDER BY id DESC",
        ENTRY_COLUMNS
    ))
    .bind(date.format(DATE_FORMAT).to_string())
    .fetch_all(executor)
    .await
    .context("Failed to list entries by date")?;

    Ok(decode_entries(&rows))
}

/// Decode listed rows, skipping any that no longer decode (unknown kind,
/// malformed date) so one bad row does not hide the rest.
fn decode_entries(rows: &[SqliteRow]) -> Vec<Entry> {
    rows.iter()
        .filter_map(|row| match Repository::row_to_entry(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping undecodable entry");
                None
            }
        })
        .collect()
}

/// Wrap `needle` in `%` wildcards, escaping LIKE metacharacters so it
/// matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
