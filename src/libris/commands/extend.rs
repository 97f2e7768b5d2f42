use crate::commands::helpers::save_ledger;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibrisError, Result};
use crate::library::Library;
use crate::model::LoanPolicy;
use crate::store::StorageBackend;

/// Pushes back the due date of every outstanding loan on a title.
///
/// Only the ledger is rewritten: due dates live there, the inventory counts
/// do not change.
pub fn run<B: StorageBackend>(
    library: &mut Library,
    backend: &B,
    policy: &LoanPolicy,
    title: &str,
) -> Result<CmdResult> {
    let wanted = title.trim().to_lowercase();
    let record = library
        .items
        .iter()
        .find(|r| r.is_borrowed() && r.title.to_lowercase() == wanted)
        .cloned()
        .ok_or_else(|| LibrisError::NotBorrowed(title.trim().to_string()))?;

    let mut extended = Vec::new();
    for borrower in library.borrowers.iter_mut() {
        for loan in borrower.loans.iter_mut().filter(|l| l.slot == record.id) {
            loan.due_on = policy.extended(loan.due_on);
            extended.push(loan.clone());
        }
    }

    save_ledger(library, backend)?;
    tracing::info!(
        slot = %record.id,
        loans = extended.len(),
        days = policy.extension_days,
        "extended loans"
    );

    let mut result = CmdResult::default();
    let due = library
        .earliest_due(record.id)
        .map(|d| format!(", next due {}", d))
        .unwrap_or_default();
    result.add_message(CmdMessage::success(format!(
        "Extended \"{}\" by {} day(s){}",
        record.title, policy.extension_days, due
    )));
    result.affected_items.push(record);
    result.affected_loans = extended;
    Ok(result)
}
