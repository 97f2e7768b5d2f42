use crate::commands::helpers::{copies, save_inventory};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibrisError, Result};
use crate::library::Library;
use crate::model::{validate_title, InventoryRecord, LoanPolicy};
use crate::store::StorageBackend;

/// Adds `quantity` copies of a title, creating the record if it is new.
pub fn run<B: StorageBackend>(
    library: &mut Library,
    backend: &B,
    policy: &LoanPolicy,
    title: &str,
    quantity: u32,
) -> Result<CmdResult> {
    let title = validate_title(title)?;
    if quantity == 0 {
        return Err(LibrisError::QuantityOutOfRange(
            "quantity must be at least 1".to_string(),
        ));
    }

    let existing = library.items.iter().position(|r| r.title == title);
    let current = existing.map(|i| library.items[i].total).unwrap_or(0);
    let wanted = u64::from(current) + u64::from(quantity);
    if wanted > u64::from(policy.max_copies) {
        return Err(LibrisError::QuantityOutOfRange(format!(
            "\"{}\" would have {} copies, the maximum is {}",
            title, wanted, policy.max_copies
        )));
    }

    let mut result = CmdResult::default();
    let record = match existing {
        Some(index) => {
            let record = &mut library.items[index];
            record.add_copies(quantity);
            result.add_message(CmdMessage::success(format!(
                "Added {} of \"{}\" ({} in total)",
                copies(quantity),
                record.title,
                record.total
            )));
            record.clone()
        }
        None => {
            let id = library.allocate_id();
            let record = InventoryRecord::new(id, title, quantity);
            library.items.push(record.clone());
            result.add_message(CmdMessage::success(format!(
                "Added \"{}\" ({})",
                record.title,
                copies(quantity)
            )));
            record
        }
    };

    save_inventory(library, backend)?;
    tracing::info!(slot = %record.id, title = %record.title, quantity, "added copies");
    result.affected_items.push(record);
    Ok(result)
}
