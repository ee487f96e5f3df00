use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::LedgerService;
use crate::domain::{
    format_cents, parse_cents, Category, DailySummary, Entry, EntryDraft, EntryKind,
};

/// Caja - Income and Expense Tracker
#[derive(Parser)]
#[command(name = "caja")]
#[command(about = "A local-first tracker for daily income and expenses")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "CAJA_DATABASE", default_value = "control_dinero.db")]
    pub database: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for EntryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Income => EntryKind::Income,
            KindArg::Expense => EntryKind::Expense,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record an income or expense
    Add {
        /// income or expense
        #[arg(value_enum)]
        kind: KindArg,

        /// What the money was for
        #[arg(short, long)]
        description: String,

        /// Category (see `caja categories`)
        #[arg(short, long)]
        category: String,

        /// Amount (e.g., "15.50" or "1000")
        #[arg(short, long)]
        amount: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List all entries, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Search descriptions and categories (case-insensitive)
    Search {
        /// Text to look for
        text: String,
    },

    /// Show the summary and entries of one day
    Day {
        /// Date (YYYY-MM-DD, defaults to today)
        date: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show all-time income, expense and balance
    Totals,

    /// Edit an entry; omitted fields keep their value
    Edit {
        /// Entry ID
        id: i64,

        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        amount: Option<String>,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: i64,
    },

    /// List the categories available for each kind
    Categories {
        /// Only show one kind
        #[arg(value_enum)]
        kind: Option<KindArg>,
    },

    /// Export entries to CSV or JSON
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import entries from a CSV export
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                let service = LedgerService::init(&self.database).await?;
                println!(
                    "Database initialized: {} (schema v{})",
                    self.database,
                    service.schema_version().await?
                );
            }

            Commands::Add {
                kind,
                description,
                category,
                amount,
                date,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let kind = EntryKind::from(kind);
                let category = resolve_category(kind, &category)?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '15.50' or '15'")?;
                let date = parse_entry_date(date.as_deref(), Local::now().date_naive())?;

                let entry = service
                    .record_entry(EntryDraft::new(
                        kind,
                        description,
                        category.as_str(),
                        amount_cents,
                        date,
                    ))
                    .await?;

                println!(
                    "Recorded {} #{}: {} {} ({})",
                    entry.kind,
                    entry.id,
                    format_cents(entry.amount_cents),
                    entry.description,
                    entry.date
                );
            }

            Commands::List { json } => {
                let service = LedgerService::connect(&self.database).await?;
                let entries = service.list_entries().await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else {
                    print_entries(&entries);
                }
            }

            Commands::Search { text } => {
                let service = LedgerService::connect(&self.database).await?;
                let entries = service.search_entries(text.trim()).await?;
                print_entries(&entries);
            }

            Commands::Day { date, json } => {
                let service = LedgerService::connect(&self.database).await?;
                let date = parse_date_or_today(date.as_deref())?;
                let report = service.day_report(date).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_summary(&report.summary);
                    println!();
                    print_entries(&report.entries);
                }
            }

            Commands::Totals => {
                let service = LedgerService::connect(&self.database).await?;
                let totals = service.totals().await?;
                println!("Entries:  {}", totals.entry_count);
                println!("Income:   {:>12}", format_cents(totals.total_income));
                println!("Expense:  {:>12}", format_cents(totals.total_expense));
                println!("{}", "-".repeat(22));
                println!("Balance:  {:>12}", format_cents(totals.balance));
            }

            Commands::Edit {
                id,
                kind,
                description,
                category,
                amount,
                date,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let current = service.get_entry(id).await?;
                let edit = EntryEdit {
                    kind: kind.map(EntryKind::from),
                    description,
                    category,
                    amount,
                    date,
                };
                let draft = merge_edit(&current, edit, Local::now().date_naive())?;

                let entry = service.update_entry(id, draft).await?;
                println!(
                    "Updated #{}: {} {} {} ({})",
                    entry.id,
                    entry.kind,
                    format_cents(entry.amount_cents),
                    entry.description,
                    entry.date
                );
            }

            Commands::Delete { id } => {
                let service = LedgerService::connect(&self.database).await?;
                service.delete_entry(id).await?;
                println!("Deleted entry #{}", id);
            }

            Commands::Categories { kind } => {
                let kinds = match kind {
                    Some(kind) => vec![EntryKind::from(kind)],
                    None => vec![EntryKind::Income, EntryKind::Expense],
                };
                for kind in kinds {
                    let labels: Vec<&str> = kind.categories().iter().map(|c| c.as_str()).collect();
                    println!("{:<8} {}", kind, labels.join(", "));
                }
            }

            Commands::Export { format, output } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, format, output.as_deref()).await?;
            }

            Commands::Import { input, dry_run } => {
                let service = LedgerService::connect(&self.database).await?;
                run_import_command(&service, input.as_deref(), dry_run).await?;
            }
        }

        Ok(())
    }
}

async fn run_export_command(
    service: &LedgerService,
    format: ExportFormat,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_entries_csv(writer).await?,
        ExportFormat::Json => exporter.export_entries_json(writer).await?.entries.len(),
    };

    if output.is_some() {
        eprintln!("Exported {} entries", count);
    }
    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{stdin, Read};

    let importer = Importer::new(service);

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = importer
        .import_entries_csv(reader, ImportOptions { dry_run })
        .await?;

    if dry_run {
        println!("Dry run: {} entries would be imported", result.imported);
    } else {
        println!("Imported {} entries", result.imported);
    }

    if !result.errors.is_empty() {
        println!("{} line(s) rejected:", result.errors.len());
        for error in &result.errors {
            match &error.field {
                Some(field) => println!("  line {} [{}]: {}", error.line, field, error.error),
                None => println!("  line {}: {}", error.line, error.error),
            }
        }
    }
    Ok(())
}

/// Field overrides for `caja edit`; `None` keeps the stored value.
#[derive(Debug, Default)]
struct EntryEdit {
    kind: Option<EntryKind>,
    description: Option<String>,
    category: Option<String>,
    amount: Option<String>,
    date: Option<String>,
}

/// Apply `edit` on top of `current`, producing the full record to store.
///
/// Switching kind without naming a category is refused unless the stored
/// category also belongs to the new kind's vocabulary.
fn merge_edit(current: &Entry, edit: EntryEdit, today: NaiveDate) -> Result<EntryDraft> {
    let mut draft = current.to_draft();

    if let Some(kind) = edit.kind {
        draft.kind = kind;
    }
    if let Some(description) = edit.description {
        draft.description = description;
    }
    if let Some(category) = edit.category {
        draft.category = resolve_category(draft.kind, &category)?.as_str().to_string();
    } else if draft.kind != current.kind
        && Category::parse_for(draft.kind, &draft.category).is_none()
    {
        anyhow::bail!(
            "Category '{}' does not apply to {}; pass --category",
            draft.category,
            draft.kind
        );
    }
    if let Some(amount) = edit.amount {
        draft.amount_cents =
            parse_cents(&amount).context("Invalid amount format. Use '15.50' or '15'")?;
    }
    if let Some(date) = edit.date {
        draft.date = parse_entry_date(Some(&date), today)?;
    }

    Ok(draft)
}

fn print_entries(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries found.");
        return;
    }

    println!(
        "{:<6} {:<10} {:<8} {:<14} {:<28} {:>12}",
        "ID", "DATE", "KIND", "CATEGORY", "DESCRIPTION", "AMOUNT"
    );
    println!("{}", "-".repeat(83));
    for entry in entries {
        println!(
            "{:<6} {:<10} {:<8} {:<14} {:<28} {:>12}",
            entry.id,
            entry.date.format("%Y-%m-%d"),
            entry.kind,
            truncate(&entry.category, 14),
            truncate(&entry.description, 28),
            format_cents(entry.signed_amount())
        );
    }
}

fn print_summary(summary: &DailySummary) {
    println!("Summary for {}", summary.date.format("%Y-%m-%d"));
    println!("  Income:   {:>12}", format_cents(summary.total_income));
    println!("  Expense:  {:>12}", format_cents(summary.total_expense));
    println!("  Balance:  {:>12}", format_cents(summary.balance));
}

fn resolve_category(kind: EntryKind, label: &str) -> Result<Category> {
    if let Some(category) = Category::parse_for(kind, label) {
        return Ok(category);
    }

    let valid: Vec<&str> = kind.categories().iter().map(|c| c.as_str()).collect();
    let other_kind = Category::INCOME
        .iter()
        .chain(Category::EXPENSE)
        .find(|c| c.as_str().eq_ignore_ascii_case(label.trim()))
        .map(|c| c.kind());

    match other_kind {
        Some(other_kind) => anyhow::bail!(
            "Category '{}' is an {} category. Valid categories for {}: {}",
            label.trim(),
            other_kind,
            kind,
            valid.join(", ")
        ),
        None => anyhow::bail!(
            "Invalid category '{}' for {}. Valid categories: {}",
            label,
            kind,
            valid.join(", ")
        ),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}

/// Date of a new or edited entry: defaults to `today` and may not be later.
fn parse_entry_date(date_str: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let date = match date_str {
        Some(date_str) => parse_date(date_str)?,
        None => today,
    };
    if date > today {
        anyhow::bail!("Date {} is in the future (today is {})", date, today);
    }
    Ok(date)
}

fn parse_date_or_today(date_str: Option<&str>) -> Result<NaiveDate> {
    match date_str {
        Some(date_str) => parse_date(date_str),
        None => Ok(Local::now().date_naive()),
    }
}
