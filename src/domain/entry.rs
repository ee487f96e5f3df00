use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

/// Store-assigned surrogate key of an entry.
pub type EntryId = i64;

/// Whether an entry brings money in or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// The exact text persisted in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "Income",
            EntryKind::Expense => "Expense",
        }
    }

    /// Categories offered for this kind.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            EntryKind::Income => Category::INCOME,
            EntryKind::Expense => Category::EXPENSE,
        }
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    /// Accepts the stored spelling case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(format!("unknown entry kind '{}'", other)),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed category vocabulary offered to users, conditioned on kind.
///
/// The store itself keeps categories as free text; only the front end
/// restricts input to this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Sale,
    Salary,
    Loan,
    OtherIncome,
    Transport,
    Food,
    Utilities,
    Shopping,
    OtherExpense,
}

impl Category {
    pub const INCOME: &'static [Category] = &[
        Category::Sale,
        Category::Salary,
        Category::Loan,
        Category::OtherIncome,
    ];

    pub const EXPENSE: &'static [Category] = &[
        Category::Transport,
        Category::Food,
        Category::Utilities,
        Category::Shopping,
        Category::OtherExpense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sale => "Sale",
            Category::Salary => "Salary",
            Category::Loan => "Loan",
            Category::OtherIncome => "Other-Income",
            Category::Transport => "Transport",
            Category::Food => "Food",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::OtherExpense => "Other-Expense",
        }
    }

    pub fn kind(&self) -> EntryKind {
        if Category::INCOME.contains(self) {
            EntryKind::Income
        } else {
            EntryKind::Expense
        }
    }

    /// Look up a category label within the vocabulary of `kind`.
    pub fn parse_for(kind: EntryKind, label: &str) -> Option<Self> {
        let label = label.trim();
        kind.categories()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The caller-supplied fields of an entry, used for both insert and
/// full-record update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub kind: EntryKind,
    pub description: String,
    pub category: String,
    /// Amount in cents (must be positive)
    pub amount_cents: Cents,
    pub date: NaiveDate,
}

impl EntryDraft {
    pub fn new(
        kind: EntryKind,
        description: impl Into<String>,
        category: impl Into<String>,
        amount_cents: Cents,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            category: category.into(),
            amount_cents,
            date,
        }
    }
}

/// One recorded income or expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub description: String,
    pub category: String,
    pub amount_cents: Cents,
    pub date: NaiveDate,
}

impl Entry {
    pub fn from_draft(id: EntryId, draft: EntryDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            description: draft.description,
            category: draft.category,
            amount_cents: draft.amount_cents,
            date: draft.date,
        }
    }

    /// The entry's fields without its id, ready for an edit.
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            kind: self.kind,
            description: self.description.clone(),
            category: self.category.clone(),
            amount_cents: self.amount_cents,
            date: self.date,
        }
    }

    /// Amount with the sign of its effect on the balance.
    pub fn signed_amount(&self) -> Cents {
        match self.kind {
            EntryKind::Income => self.amount_cents,
            EntryKind::Expense => -self.amount_cents,
        }
    }
}
