//! Session start: load both stores and reconcile them.
//!
//! Nothing here writes. Whatever had to be repaired on the way in is listed
//! in the [`LoadReport`]; rewriting the stores is the job of `doctor::heal`.

use crate::error::Result;
use crate::library::Library;
use crate::model::LoanPolicy;
use crate::reconcile::{reconcile, QuantitySync};
use crate::store::{inventory, ledger, Diagnostic, DiagnosticKind, StorageBackend};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inventory: Vec<Diagnostic>,
    pub ledger: Vec<Diagnostic>,
    pub syncs: Vec<QuantitySync>,
}

impl LoadReport {
    pub fn inventory_needs_rewrite(&self) -> bool {
        !self.inventory.is_empty() || !self.syncs.is_empty()
    }

    pub fn ledger_needs_rewrite(&self) -> bool {
        !self.ledger.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.inventory_needs_rewrite() && !self.ledger_needs_rewrite()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.inventory.iter().chain(self.ledger.iter())
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics().filter(|d| d.kind == kind).count()
    }
}

pub fn run<B: StorageBackend>(
    backend: &B,
    policy: &LoanPolicy,
    today: NaiveDate,
) -> Result<(Library, LoadReport)> {
    let items = inventory::load(backend)?;
    let borrowers = ledger::load(backend, &items.value, policy, today)?;

    let mut library = Library::new(items.value, borrowers.value);
    let syncs = reconcile(&mut library);

    let report = LoadReport {
        inventory: items.diagnostics,
        ledger: borrowers.diagnostics,
        syncs,
    };
    tracing::debug!(
        items = library.items().len(),
        borrowers = library.borrowers().len(),
        clean = report.is_clean(),
        "opened library"
    );
    Ok((library, report))
}
