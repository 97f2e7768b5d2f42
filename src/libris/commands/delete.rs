use crate::commands::helpers::save_inventory;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibrisError, Result};
use crate::library::{ItemSelector, Library};
use crate::store::StorageBackend;

/// Removes a record. Records with copies out on loan stay put.
pub fn run<B: StorageBackend>(
    library: &mut Library,
    backend: &B,
    selector: &ItemSelector,
) -> Result<CmdResult> {
    let index = library.resolve(selector)?;
    let record = &library.items[index];
    if record.is_borrowed() {
        return Err(LibrisError::InProgress {
            title: record.title.clone(),
            borrowed: record.borrowed,
        });
    }

    let record = library.items.remove(index);
    save_inventory(library, backend)?;
    tracing::info!(slot = %record.id, title = %record.title, "deleted record");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Deleted \"{}\"", record.title)));
    result.affected_items.push(record);
    Ok(result)
}
