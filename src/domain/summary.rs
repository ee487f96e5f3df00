use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, Entry};

/// Income, expense and balance for a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_income: Cents,
    pub total_expense: Cents,
    /// `total_income - total_expense`, may be negative
    pub balance: Cents,
}

impl DailySummary {
    pub fn new(date: NaiveDate, total_income: Cents, total_expense: Cents) -> Self {
        Self {
            date,
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

/// A date's summary together with the entries it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub summary: DailySummary,
    /// Newest first
    pub entries: Vec<Entry>,
}

/// All-time figures across the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub entry_count: i64,
    pub total_income: Cents,
    pub total_expense: Cents,
    pub balance: Cents,
}

impl LedgerTotals {
    pub fn new(entry_count: i64, total_income: Cents, total_expense: Cents) -> Self {
        Self {
            entry_count,
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_may_go_negative() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let summary = DailySummary::new(date, 1000, 2550);
        assert_eq!(summary.balance, -1550);
        assert_eq!(DailySummary::new(date, 0, 0).balance, 0);
    }
}
