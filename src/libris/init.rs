//! Session bootstrap: find the data directory, read the config, make sure both
//! store files exist and open the library.

use crate::api::LibrisApi;
use crate::config::LibrisConfig;
use crate::error::{LibrisError, Result};
use crate::store::fs::FileStore;
use crate::store::{StorageBackend, StoreKind};
use chrono::NaiveDate;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "LIBRIS_HOME";

pub struct LibrisContext {
    pub api: LibrisApi<FileStore>,
    pub config: LibrisConfig,
}

/// `--home` wins, then `LIBRIS_HOME`, then the platform data directory.
pub fn resolve_data_dir(home: Option<&Path>) -> Result<PathBuf> {
    if let Some(home) = home {
        return Ok(home.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "libris", "libris")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            LibrisError::Config(format!(
                "could not determine a data directory; pass --home or set {}",
                HOME_ENV
            ))
        })
}

/// Opens the library in `data_dir`, creating empty stores on first use.
///
/// The returned API has been loaded and reconciled but not healed.
pub fn initialize(data_dir: &Path, today: NaiveDate) -> Result<LibrisContext> {
    let config = LibrisConfig::load(data_dir)?;
    let store = FileStore::new(
        data_dir.join(&config.inventory_file),
        data_dir.join(&config.ledger_file),
    );
    store.ensure_store(StoreKind::Inventory)?;
    store.ensure_store(StoreKind::Ledger)?;
    tracing::debug!(dir = %data_dir.display(), "using data directory");

    let api = LibrisApi::open(store, data_dir, config.policy(), today)?;
    Ok(LibrisContext { api, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn explicit_home_wins() {
        let temp = TempDir::new().unwrap();
        assert_eq!(resolve_data_dir(Some(temp.path())).unwrap(), temp.path());
    }

    #[test]
    fn first_run_creates_empty_stores() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("libris");

        let ctx = initialize(&home, today()).unwrap();

        assert!(home.join("inventory.txt").exists());
        assert!(home.join("ledger.txt").exists());
        assert!(ctx.api.library().items().is_empty());
        assert!(ctx.api.report().is_clean());
    }

    #[test]
    fn honours_configured_file_names_and_policy() {
        let temp = TempDir::new().unwrap();
        let mut config = LibrisConfig::default();
        config.set("inventory_file", "books.txt").unwrap();
        config.set("loan_days", "21").unwrap();
        config.save(temp.path()).unwrap();
        fs::write(temp.path().join("books.txt"), "1 | Dune | 1 | 0 | 1\n").unwrap();

        let ctx = initialize(temp.path(), today()).unwrap();

        assert_eq!(ctx.api.library().items()[0].title, "Dune");
        assert_eq!(ctx.api.policy().loan_days, 21);
        assert!(!temp.path().join("inventory.txt").exists());
    }
}
