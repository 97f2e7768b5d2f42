//! # Library State
//!
//! [`Library`] is the whole in-memory state of a session: the inventory in
//! insertion order, the borrowers with their loans, and the slot id
//! high-water mark. It is owned by the API facade and handed by reference to
//! every command; nothing reaches it through globals.
//!
//! ## Positions and Slots
//!
//! Users address records by their 1-based **position** in the inventory (the
//! number shown by `list`) or by title. Loans never store positions: they
//! store the record's [`SlotId`], which survives deletes and reorders. The
//! two only coincide for data migrated from the legacy positional format.

use crate::error::{LibrisError, Result};
use crate::model::{Borrower, InventoryRecord, Loan, SlotId};
use chrono::NaiveDate;
use std::fmt;

/// A user input naming an inventory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    /// 1-based position in inventory order.
    Position(usize),
    /// Case-insensitive exact title.
    Title(String),
}

impl ItemSelector {
    /// Purely numeric input is a position; titles can never be purely numeric.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<usize>() {
            Ok(n) => ItemSelector::Position(n),
            Err(_) => ItemSelector::Title(input.to_string()),
        }
    }
}

impl fmt::Display for ItemSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSelector::Position(n) => write!(f, "position {}", n),
            ItemSelector::Title(t) => write!(f, "\"{}\"", t),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub(crate) items: Vec<InventoryRecord>,
    pub(crate) borrowers: Vec<Borrower>,
    next_id: u32,
}

impl Library {
    pub fn new(items: Vec<InventoryRecord>, borrowers: Vec<Borrower>) -> Self {
        let next_id = items.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        Self {
            items,
            borrowers,
            next_id,
        }
    }

    pub fn items(&self) -> &[InventoryRecord] {
        &self.items
    }

    pub fn borrowers(&self) -> &[Borrower] {
        &self.borrowers
    }

    pub fn record(&self, slot: SlotId) -> Option<&InventoryRecord> {
        self.items.iter().find(|r| r.id == slot)
    }

    /// 1-based position of the record with this slot id.
    pub fn position_of(&self, slot: SlotId) -> Option<usize> {
        self.items.iter().position(|r| r.id == slot).map(|i| i + 1)
    }

    pub fn borrower(&self, name: &str) -> Option<&Borrower> {
        self.borrowers.iter().find(|b| b.name == name)
    }

    /// Resolves a selector to an index into `items`.
    ///
    /// Title matching is case-insensitive and the first match wins.
    pub fn resolve(&self, selector: &ItemSelector) -> Result<usize> {
        let found = match selector {
            ItemSelector::Position(n) => n.checked_sub(1).filter(|i| *i < self.items.len()),
            ItemSelector::Title(title) => {
                let wanted = title.to_lowercase();
                self.items
                    .iter()
                    .position(|r| r.title.to_lowercase() == wanted)
            }
        };
        found.ok_or_else(|| LibrisError::NotFound(selector.to_string()))
    }

    pub fn loans_for(&self, slot: SlotId) -> impl Iterator<Item = (&Borrower, &Loan)> {
        self.borrowers.iter().flat_map(move |b| {
            b.loans
                .iter()
                .filter(move |loan| loan.slot == slot)
                .map(move |loan| (b, loan))
        })
    }

    pub fn loan_count(&self, slot: SlotId) -> u32 {
        self.loans_for(slot).count() as u32
    }

    /// The representative due date of a record: its earliest outstanding loan.
    pub fn earliest_due(&self, slot: SlotId) -> Option<NaiveDate> {
        self.loans_for(slot).map(|(_, loan)| loan.due_on).min()
    }

    pub(crate) fn allocate_id(&mut self) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn borrower_mut(&mut self, name: &str) -> Option<&mut Borrower> {
        self.borrowers.iter_mut().find(|b| b.name == name)
    }

    /// Returns the borrower, creating it at the end of the ledger if new.
    pub(crate) fn borrower_entry(&mut self, name: &str) -> &mut Borrower {
        let index = match self.borrowers.iter().position(|b| b.name == name) {
            Some(index) => index,
            None => {
                self.borrowers.push(Borrower::new(name.to_string()));
                self.borrowers.len() - 1
            }
        };
        &mut self.borrowers[index]
    }

    /// Drops borrowers left without loans; the ledger cannot represent them.
    pub(crate) fn prune_borrowers(&mut self) {
        self.borrowers.retain(|b| !b.loans.is_empty());
    }
}
