use crate::error::Result;
use crate::library::Library;
use crate::store::{inventory, ledger, StorageBackend};

pub fn save_inventory<B: StorageBackend>(library: &Library, backend: &B) -> Result<()> {
    inventory::save(backend, library.items())
}

pub fn save_ledger<B: StorageBackend>(library: &Library, backend: &B) -> Result<()> {
    ledger::save(backend, library.borrowers())
}

/// Rewrites both stores, inventory first.
pub fn save_all<B: StorageBackend>(library: &Library, backend: &B) -> Result<()> {
    save_inventory(library, backend)?;
    save_ledger(library, backend)
}

/// "1 copy", "3 copies".
pub fn copies(n: u32) -> String {
    if n == 1 {
        "1 copy".to_string()
    } else {
        format!("{} copies", n)
    }
}
