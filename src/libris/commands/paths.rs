use crate::commands::CmdResult;
use crate::config::LibrisConfig;
use crate::error::Result;
use crate::store::{StorageBackend, StoreKind};
use std::path::Path;

/// Data directory, config file, inventory store, ledger store.
pub fn run<B: StorageBackend>(backend: &B, data_dir: &Path) -> Result<CmdResult> {
    let paths = vec![
        data_dir.to_path_buf(),
        LibrisConfig::path(data_dir),
        backend.store_path(StoreKind::Inventory),
        backend.store_path(StoreKind::Ledger),
    ];
    Ok(CmdResult::default().with_paths(paths))
}
