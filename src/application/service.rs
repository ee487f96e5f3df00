use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{
    DailySummary, DayReport, Entry, EntryDraft, EntryId, LedgerTotals, MAX_AMOUNT_CENTS,
};
use crate::storage::{Repository, SCHEMA_VERSION};

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, importers, tests).
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating the file if needed,
    /// and bring its schema up to date.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let service = Self::new(Repository::connect(&db_url).await?);
        service.migrate().await?;
        Ok(service)
    }

    /// Open an existing database and bring its schema up to date.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let service = Self::new(Repository::connect(&db_url).await?);
        service.migrate().await?;
        Ok(service)
    }

    // ========================
    // Schema
    // ========================

    /// Create the schema if absent, or run the destructive upgrade when the
    /// stored version is older than [`SCHEMA_VERSION`].
    pub async fn migrate(&self) -> Result<(), AppError> {
        let found = self.repo.schema_version().await?;
        match found {
            0 => {
                debug!("creating schema version {}", SCHEMA_VERSION);
                self.repo.initialize().await?;
            }
            v if v < SCHEMA_VERSION => {
                self.upgrade_schema(v, SCHEMA_VERSION).await?;
            }
            v if v == SCHEMA_VERSION => {
                self.repo.initialize().await?;
            }
            v => {
                return Err(AppError::UnsupportedSchemaVersion {
                    found: v,
                    supported: SCHEMA_VERSION,
                });
            }
        }
        Ok(())
    }

    /// Drop and recreate the entries table. All stored entries are lost.
    pub async fn upgrade_schema(&self, old_version: i64, new_version: i64) -> Result<u64, AppError> {
        let discarded = self.repo.upgrade(old_version, new_version).await?;
        warn!(
            old_version,
            new_version, discarded, "schema upgraded, existing entries discarded"
        );
        Ok(discarded)
    }

    /// Version currently stamped in the database.
    pub async fn schema_version(&self) -> Result<i64, AppError> {
        Ok(self.repo.schema_version().await?)
    }

    // ========================
    // Entry operations
    // ========================

    /// Record a new entry.
    pub async fn record_entry(&self, draft: EntryDraft) -> Result<Entry, AppError> {
        let draft = validate_draft(draft)?;
        let entry = self.repo.insert_entry(draft).await?;
        info!(
            id = entry.id,
            kind = %entry.kind,
            date = %entry.date,
            amount_cents = entry.amount_cents,
            "recorded entry"
        );
        Ok(entry)
    }

    /// Get an entry by id.
    pub async fn get_entry(&self, id: EntryId) -> Result<Entry, AppError> {
        self.repo
            .get_entry(id)
            .await?
            .ok_or(AppError::EntryNotFound(id))
    }

    /// Every entry, newest date first.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, AppError> {
        let entries = self.repo.list_entries().await?;
        debug!(count = entries.len(), "listed entries");
        Ok(entries)
    }

    /// Entries whose description or category contains `needle`,
    /// ignoring ASCII case. An empty needle matches everything.
    pub async fn search_entries(&self, needle: &str) -> Result<Vec<Entry>, AppError> {
        let entries = self.repo.search_entries(needle).await?;
        debug!(needle, count = entries.len(), "searched entries");
        Ok(entries)
    }

    /// Entries of one date, newest first.
    pub async fn entries_on(&self, date: NaiveDate) -> Result<Vec<Entry>, AppError> {
        Ok(self.repo.list_entries_by_date(date).await?)
    }

    /// Income, expense and balance of one date.
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary, AppError> {
        let summary = self.repo.summarize_date(date).await?;
        debug!(%date, balance = summary.balance, "summarized date");
        Ok(summary)
    }

    /// Summary and entries of one date, consistent with each other.
    pub async fn day_report(&self, date: NaiveDate) -> Result<DayReport, AppError> {
        Ok(self.repo.day_report(date).await?)
    }

    /// All-time income, expense and balance.
    pub async fn totals(&self) -> Result<LedgerTotals, AppError> {
        Ok(self.repo.totals().await?)
    }

    /// Replace every field of entry `id`, keeping the id.
    pub async fn update_entry(&self, id: EntryId, draft: EntryDraft) -> Result<Entry, AppError> {
        let draft = validate_draft(draft)?;
        if self.repo.update_entry(id, &draft).await? == 0 {
            warn!(id, "update of missing entry");
            return Err(AppError::EntryNotFound(id));
        }
        info!(id, "updated entry");
        Ok(Entry::from_draft(id, draft))
    }

    /// Delete entry `id`.
    pub async fn delete_entry(&self, id: EntryId) -> Result<(), AppError> {
        if self.repo.delete_entry(id).await? == 0 {
            warn!(id, "delete of missing entry");
            return Err(AppError::EntryNotFound(id));
        }
        info!(id, "deleted entry");
        Ok(())
    }
}

/// Enforce field constraints and trim text fields.
pub(crate) fn validate_draft(mut draft: EntryDraft) -> Result<EntryDraft, AppError> {
    draft.description = draft.description.trim().to_string();
    draft.category = draft.category.trim().to_string();

    if draft.description.is_empty() {
        return Err(AppError::EmptyField("description"));
    }
    if draft.category.is_empty() {
        return Err(AppError::EmptyField("category"));
    }
    if draft.amount_cents <= 0 || draft.amount_cents > MAX_AMOUNT_CENTS {
        return Err(AppError::InvalidAmount(draft.amount_cents));
    }
    Ok(draft)
}
