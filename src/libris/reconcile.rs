//! # Reconciliation
//!
//! Brings inventory counters back in line with the ledger after both stores
//! have been loaded. The ledger decides how many copies of a record are out;
//! the inventory decides how many copies exist, and grows to make room for
//! loans it did not know about unless its total is already at `u32::MAX`.
//!
//! | ledger vs. `borrowed`             | effect                                             |
//! |-----------------------------------|----------------------------------------------------|
//! | more loans                        | `borrowed` raised, `total` grows by the gap        |
//! | more loans, `total` cannot grow   | `borrowed` raised, `available` shrinks by the gap  |
//! | fewer loans                       | `borrowed` lowered, `available` grows by the gap   |
//! | equal                             | nothing                                            |
//!
//! Running it twice changes nothing the second time.

use crate::library::Library;
use crate::model::SlotId;

/// One counter correction made by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantitySync {
    pub slot: SlotId,
    pub title: String,
    /// `(total, borrowed, available)` before the correction.
    pub before: (u32, u32, u32),
    pub after: (u32, u32, u32),
}

pub fn reconcile(library: &mut Library) -> Vec<QuantitySync> {
    let counts: Vec<u32> = library
        .items
        .iter()
        .map(|record| library.loan_count(record.id))
        .collect();

    let mut syncs = Vec::new();
    for (record, ledger) in library.items.iter_mut().zip(counts) {
        let book = record.borrowed;
        if ledger == book {
            continue;
        }

        let before = (record.total, record.borrowed, record.available);
        if ledger > book {
            match record.total.checked_add(ledger - book) {
                Some(total) => record.total = total,
                // No room to grow: the loans come out of the available copies
                None => {
                    record.total = record.total.max(ledger);
                    record.available = record.total - ledger;
                }
            }
        } else {
            record.available += book - ledger;
        }
        record.borrowed = ledger;
        let after = (record.total, record.borrowed, record.available);

        tracing::info!(
            slot = %record.id,
            title = %record.title,
            ledger,
            recorded = book,
            "synced borrowed copies with the ledger"
        );
        syncs.push(QuantitySync {
            slot: record.id,
            title: record.title.clone(),
            before,
            after,
        });
    }
    syncs
}
