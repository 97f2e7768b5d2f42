use crate::error::{LibrisError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between fields in both text stores.
pub const FIELD_SEPARATOR: &str = " | ";

/// Stable identity of an inventory record.
///
/// Assigned once when the record is created and carried by every loan that
/// references it, so reordering or deleting records never re-points a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One titled work and its copy-count bookkeeping.
///
/// `total == borrowed + available` holds after load and after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: SlotId,
    pub title: String,
    pub total: u32,
    pub borrowed: u32,
    pub available: u32,
}

impl InventoryRecord {
    pub fn new(id: SlotId, title: String, copies: u32) -> Self {
        Self {
            id,
            title,
            total: copies,
            borrowed: 0,
            available: copies,
        }
    }

    pub fn is_consistent(&self) -> bool {
        u64::from(self.borrowed) + u64::from(self.available) == u64::from(self.total)
    }

    pub fn is_borrowed(&self) -> bool {
        self.borrowed > 0
    }

    pub(crate) fn check_out(&mut self) {
        self.available -= 1;
        self.borrowed += 1;
    }

    pub(crate) fn check_in(&mut self) {
        self.borrowed = self.borrowed.saturating_sub(1);
        self.available += 1;
    }

    pub(crate) fn add_copies(&mut self, quantity: u32) {
        self.total += quantity;
        self.available += quantity;
    }
}

/// One active loan. The owning borrower is the [`Borrower`] holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub slot: SlotId,
    /// Title of the record when the loan was made, checked against the inventory on load.
    pub title: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
}

impl Loan {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_on < today
    }

    /// Whole days past the due date, if any.
    pub fn days_overdue(&self, today: NaiveDate) -> Option<i64> {
        self.is_overdue(today)
            .then(|| (today - self.due_on).num_days())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub name: String,
    pub loans: Vec<Loan>,
}

impl Borrower {
    pub fn new(name: String) -> Self {
        Self {
            name,
            loans: Vec::new(),
        }
    }

    pub fn holds(&self, slot: SlotId) -> bool {
        self.loans.iter().any(|loan| loan.slot == slot)
    }
}

/// Lending rules applied by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    pub loan_days: u32,
    pub extension_days: u32,
    pub max_copies: u32,
    /// Lets one borrower hold several copies of the same title.
    pub allow_repeat_loans: bool,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_days: 14,
            extension_days: 7,
            max_copies: 1000,
            allow_repeat_loans: false,
        }
    }
}

impl LoanPolicy {
    pub fn due_date(&self, from: NaiveDate) -> NaiveDate {
        add_days(from, self.loan_days)
    }

    pub fn extended(&self, due_on: NaiveDate) -> NaiveDate {
        add_days(due_on, self.extension_days)
    }
}

pub(crate) fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Normalizes a title, rejecting values the stores cannot hold or that would
/// be mistaken for a position.
pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LibrisError::InvalidTitle("title cannot be blank".into()));
    }
    if title.chars().all(|c| c.is_ascii_digit()) {
        return Err(LibrisError::InvalidTitle(format!(
            "\"{}\" is purely numeric",
            title
        )));
    }
    if title.contains('|') {
        return Err(LibrisError::InvalidTitle(format!(
            "\"{}\" contains the field separator '|'",
            title
        )));
    }
    if title.contains(char::REPLACEMENT_CHARACTER) {
        return Err(LibrisError::InvalidTitle(format!(
            "\"{}\" contains an undecodable character",
            title
        )));
    }
    Ok(title.to_string())
}

pub fn validate_borrower(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LibrisError::InvalidBorrower("name cannot be blank".into()));
    }
    if name.contains('|') {
        return Err(LibrisError::InvalidBorrower(format!(
            "\"{}\" contains the field separator '|'",
            name
        )));
    }
    if name.contains(char::REPLACEMENT_CHARACTER) {
        return Err(LibrisError::InvalidBorrower(format!(
            "\"{}\" contains an undecodable character",
            name
        )));
    }
    Ok(name.to_string())
}
