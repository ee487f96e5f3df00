use thiserror::Error;

use crate::domain::{Cents, EntryId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Invalid amount: {0} cents (must be between 0.01 and 100000000000.00)")]
    InvalidAmount(Cents),

    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// True for the "no such id" outcome of a mutation.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::EntryNotFound(_))
    }
}
