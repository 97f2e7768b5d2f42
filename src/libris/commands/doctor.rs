use crate::commands::helpers::{save_inventory, save_ledger};
use crate::commands::open::LoadReport;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::library::Library;
use crate::store::StorageBackend;

/// Rewrites the stores that were repaired while loading.
///
/// Returns which stores were written, in `(inventory, ledger)` order. A clean
/// report writes nothing.
pub fn heal<B: StorageBackend>(
    library: &Library,
    backend: &B,
    report: &LoadReport,
) -> Result<(bool, bool)> {
    let inventory = report.inventory_needs_rewrite();
    let ledger = report.ledger_needs_rewrite();
    if inventory {
        save_inventory(library, backend)?;
    }
    if ledger {
        save_ledger(library, backend)?;
    }
    if inventory || ledger {
        tracing::info!(inventory, ledger, "rewrote repaired stores");
    }
    Ok((inventory, ledger))
}

/// Turns a load report into user-facing messages.
pub fn describe(report: &LoadReport) -> CmdResult {
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return result;
    }

    result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
    for diagnostic in report.diagnostics() {
        result.add_message(CmdMessage::info(format!("  - {}", diagnostic)));
    }
    for sync in &report.syncs {
        result.add_message(CmdMessage::info(format!(
            "  - \"{}\": total/borrowed/available {}/{}/{} -> {}/{}/{}",
            sync.title,
            sync.before.0,
            sync.before.1,
            sync.before.2,
            sync.after.0,
            sync.after.1,
            sync.after.2
        )));
    }
    result
}
