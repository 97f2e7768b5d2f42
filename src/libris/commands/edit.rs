use crate::commands::helpers::save_all;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibrisError, Result};
use crate::library::{ItemSelector, Library};
use crate::model::validate_title;
use crate::store::StorageBackend;

/// Renames the record at a 1-based position.
///
/// Loans keep a title snapshot that is checked on load, so every loan on the
/// slot is renamed too and both stores are rewritten.
pub fn run<B: StorageBackend>(
    library: &mut Library,
    backend: &B,
    position: usize,
    new_title: &str,
) -> Result<CmdResult> {
    let index = library.resolve(&ItemSelector::Position(position))?;
    let title = validate_title(new_title)?;
    if library
        .items
        .iter()
        .enumerate()
        .any(|(i, r)| i != index && r.title == title)
    {
        return Err(LibrisError::TitleTaken(title));
    }

    let record = &mut library.items[index];
    let old_title = std::mem::replace(&mut record.title, title.clone());
    let slot = record.id;
    let mut renamed = Vec::new();
    for borrower in library.borrowers.iter_mut() {
        for loan in borrower.loans.iter_mut().filter(|l| l.slot == slot) {
            loan.title = title.clone();
            renamed.push(loan.clone());
        }
    }

    save_all(library, backend)?;
    tracing::info!(slot = %slot, from = %old_title, to = %title, "renamed record");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed \"{}\" to \"{}\"",
        old_title, title
    )));
    result.affected_items.push(library.items[index].clone());
    result.affected_loans = renamed;
    Ok(result)
}
