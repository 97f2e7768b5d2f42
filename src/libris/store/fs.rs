use super::{StorageBackend, StoreKind, UNDECODABLE};
use crate::error::{LibrisError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Production storage: one text file per store.
pub struct FileStore {
    inventory_path: PathBuf,
    ledger_path: PathBuf,
}

impl FileStore {
    pub fn new(inventory_path: PathBuf, ledger_path: PathBuf) -> Self {
        Self {
            inventory_path,
            ledger_path,
        }
    }

    /// Both stores in one directory under their default names.
    pub fn in_dir(root: &Path) -> Self {
        Self::new(root.join("inventory.txt"), root.join("ledger.txt"))
    }

    fn path(&self, kind: StoreKind) -> &Path {
        match kind {
            StoreKind::Inventory => &self.inventory_path,
            StoreKind::Ledger => &self.ledger_path,
        }
    }
}

/// Creates an empty file (and its parent directories) unless it already exists.
pub fn create_file_if_absent(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(LibrisError::Io)?;
        }
    }
    fs::File::create(path).map_err(LibrisError::Io)?;
    tracing::debug!(path = %path.display(), "created store file");
    Ok(())
}

/// Splits raw store bytes into lines, decoding each one on its own.
///
/// Bytes that are not UTF-8 become [`UNDECODABLE`], so the codecs can drop
/// that line and keep the rest of the file.
fn decode_lines(bytes: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
}

impl StorageBackend for FileStore {
    fn ensure_store(&self, kind: StoreKind) -> Result<()> {
        create_file_if_absent(self.path(kind))
    }

    fn read_lines(&self, kind: StoreKind) -> Result<Vec<String>> {
        let path = self.path(kind);
        let bytes = fs::read(path).map_err(|e| {
            LibrisError::Store(format!("cannot read {} store {}: {}", kind, path.display(), e))
        })?;
        Ok(decode_lines(&bytes))
    }

    fn write_lines(&self, kind: StoreKind, lines: &[String]) -> Result<()> {
        let path = self.path(kind);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("store");

        // Write to a sibling temp file and rename, so a crash never truncates the store
        let tmp = dir.join(format!(".{}.{}.tmp", file_name, std::process::id()));
        {
            let mut file = fs::File::create(&tmp).map_err(LibrisError::Io)?;
            for line in lines {
                writeln!(file, "{}", line).map_err(LibrisError::Io)?;
            }
            file.sync_all().map_err(LibrisError::Io)?;
        }
        fs::rename(&tmp, path).map_err(LibrisError::Io)?;
        Ok(())
    }

    fn store_path(&self, kind: StoreKind) -> PathBuf {
        self.path(kind).to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_files_without_touching_existing_ones() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(&dir.path().join("nested"));
        store.ensure_store(StoreKind::Inventory).unwrap();
        assert!(store.read_lines(StoreKind::Inventory).unwrap().is_empty());

        store
            .write_lines(StoreKind::Inventory, &["1 | Dune | 1 | 0 | 1".to_string()])
            .unwrap();
        store.ensure_store(StoreKind::Inventory).unwrap();
        assert_eq!(
            store.read_lines(StoreKind::Inventory).unwrap(),
            vec!["1 | Dune | 1 | 0 | 1"]
        );
    }

    #[test]
    fn writes_one_line_per_entry_with_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(dir.path());
        let lines = vec!["a".to_string(), "b".to_string()];
        store.write_lines(StoreKind::Ledger, &lines).unwrap();

        let on_disk = fs::read_to_string(dir.path().join("ledger.txt")).unwrap();
        assert_eq!(on_disk, "a\nb\n");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn invalid_utf8_only_spoils_its_own_line() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("inventory.txt"),
            b"1 | Dune | 1 | 0 | 1\r\n2 | Caf\xE9 | 1 | 0 | 1\n",
        )
        .unwrap();
        let store = FileStore::in_dir(dir.path());

        let lines = store.read_lines(StoreKind::Inventory).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1 | Dune | 1 | 0 | 1");
        assert!(lines[1].contains(UNDECODABLE));

        let loaded = crate::store::inventory::load(&store).unwrap();
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value[0].title, "Dune");
        assert_eq!(loaded.count(crate::store::DiagnosticKind::MalformedLine), 1);
    }

    #[test]
    fn decoding_keeps_blank_lines_but_not_the_final_newline() {
        assert!(decode_lines(b"").is_empty());
        assert_eq!(decode_lines(b"a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn reading_a_missing_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::in_dir(dir.path());
        assert!(matches!(
            store.read_lines(StoreKind::Ledger),
            Err(LibrisError::Store(_))
        ));
    }
}
