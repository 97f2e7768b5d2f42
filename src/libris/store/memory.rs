use super::{StorageBackend, StoreKind};
use crate::error::{LibrisError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory storage for testing and development.
/// Does NOT persist data.
///
/// Uses `RefCell` since libris is single-threaded and the backend trait
/// takes `&self` for writes.
#[derive(Default)]
pub struct InMemoryStore {
    lines: RefCell<HashMap<StoreKind, Vec<String>>>,
    writes: RefCell<HashMap<StoreKind, usize>>,
    simulate_write_error: RefCell<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store with raw lines, as if hand-edited on disk.
    pub fn with_lines(self, kind: StoreKind, lines: &[&str]) -> Self {
        self.lines
            .borrow_mut()
            .insert(kind, lines.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn raw_lines(&self, kind: StoreKind) -> Vec<String> {
        self.lines.borrow().get(&kind).cloned().unwrap_or_default()
    }

    /// How many times the store has been rewritten.
    pub fn write_count(&self, kind: StoreKind) -> usize {
        self.writes.borrow().get(&kind).copied().unwrap_or(0)
    }

    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }
}

impl StorageBackend for InMemoryStore {
    fn ensure_store(&self, kind: StoreKind) -> Result<()> {
        self.lines.borrow_mut().entry(kind).or_default();
        Ok(())
    }

    fn read_lines(&self, kind: StoreKind) -> Result<Vec<String>> {
        Ok(self.raw_lines(kind))
    }

    fn write_lines(&self, kind: StoreKind, lines: &[String]) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(LibrisError::Store("Simulated write error".to_string()));
        }
        self.lines.borrow_mut().insert(kind, lines.to_vec());
        *self.writes.borrow_mut().entry(kind).or_insert(0) += 1;
        Ok(())
    }

    fn store_path(&self, kind: StoreKind) -> PathBuf {
        PathBuf::from(format!("memory://{}", kind))
    }
}
