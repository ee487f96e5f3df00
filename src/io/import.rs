use anyhow::Result;
use chrono::NaiveDate;
use std::io::Read;

use crate::application::service::validate_draft;
use crate::application::{AppError, LedgerService};
use crate::domain::{parse_cents, EntryDraft, EntryKind};

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// A rejected CSV line
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate every line without writing anything
    pub dry_run: bool,
}

/// Importer for loading entries exported by [`super::Exporter`]
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import entries from CSV. The `id` column is ignored; every imported
    /// row gets a fresh id. Bad lines are collected in the result.
    pub async fn import_entries_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = ImportResult::default();

        for (index, record) in csv_reader.records().enumerate() {
            let line = index + 2; // header is line 1

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            // Both modes run the same checks the service applies on write,
            // so a dry run reports exactly what a real run would.
            let draft = match parse_record(&record).and_then(|draft| {
                validate_draft(draft).map_err(|e| (rejected_field(&e), e.to_string()))
            }) {
                Ok(draft) => draft,
                Err((field, error)) => {
                    result.errors.push(ImportError {
                        line,
                        field: Some(field.to_string()),
                        error,
                    });
                    continue;
                }
            };

            if options.dry_run {
                result.imported += 1;
                continue;
            }

            match self.service.record_entry(draft).await {
                Ok(_) => result.imported += 1,
                Err(AppError::Database(e)) => return Err(e),
                Err(e) => result.errors.push(ImportError {
                    line,
                    field: None,
                    error: e.to_string(),
                }),
            }
        }

        Ok(result)
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<EntryDraft, (&'static str, String)> {
    let field = |index: usize| field_at(record, index);

    let date = NaiveDate::parse_from_str(field(1), "%Y-%m-%d")
        .map_err(|e| ("date", format!("Invalid date '{}': {}", field(1), e)))?;
    let kind: EntryKind = field(2).parse().map_err(|e| ("kind", e))?;
    let amount_cents = parse_cents(field(5)).map_err(|e| ("amount", e.to_string()))?;
    if amount_cents <= 0 {
        return Err(("amount", format!("Amount must be positive: {}", field(5))));
    }

    Ok(EntryDraft::new(kind, field(4), field(3), amount_cents, date))
}

fn rejected_field(error: &AppError) -> &'static str {
    match error {
        AppError::EmptyField(field) => field,
        AppError::InvalidAmount(_) => "amount",
        _ => "record",
    }
}

fn field_at(record: &csv::StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}
