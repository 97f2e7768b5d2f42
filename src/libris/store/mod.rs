//! # Storage Layer
//!
//! Libris keeps two plain text stores side by side:
//!
//! ```text
//! <data dir>/
//! ├── inventory.txt   # ID | TITLE | TOTAL | BORROWED | AVAILABLE
//! ├── ledger.txt      # NAME | IDX | TITLE | BORROWED ON | DUE ON [| IDX | ...]
//! └── config.json
//! ```
//!
//! The split mirrors the domain: the inventory knows how many copies exist,
//! the ledger knows who holds what. They are persisted independently and can
//! drift (hand edits, stale copies, a crash between the two writes), which is
//! why loading is tolerant and reconciliation runs on every session start.
//!
//! ## Layers
//!
//! - [`StorageBackend`]: raw line I/O, the only thing that touches the
//!   filesystem. [`fs::FileStore`] in production, [`memory::InMemoryStore`]
//!   in tests.
//! - [`inventory`] and [`ledger`]: the line codecs. Parsing never fails on bad
//!   data; it skips or repairs and records a [`Diagnostic`] for each decision.
//!
//! Loading never writes. Rewriting repaired stores is the separate heal step
//! (see `commands::doctor`).

use crate::error::Result;
use std::fmt;
use std::path::PathBuf;

pub mod fs;
pub mod inventory;
pub mod ledger;
pub mod memory;

/// Date format used for every date in the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stands in for bytes that were not valid UTF-8 when a store was read.
pub const UNDECODABLE: char = char::REPLACEMENT_CHARACTER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Inventory,
    Ledger,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Inventory => write!(f, "inventory"),
            StoreKind::Ledger => write!(f, "ledger"),
        }
    }
}

/// Raw line I/O for the two stores.
///
/// Implementations know where the bytes live, never what they mean.
pub trait StorageBackend {
    /// Create the store if it does not exist yet. Existing content is untouched.
    fn ensure_store(&self, kind: StoreKind) -> Result<()>;

    /// Read every line of the store, without line terminators.
    fn read_lines(&self, kind: StoreKind) -> Result<Vec<String>>;

    /// Replace the whole store with these lines, one newline after each.
    fn write_lines(&self, kind: StoreKind, lines: &[String]) -> Result<()>;

    /// Where the store lives, for display. In-memory stores return a virtual path.
    fn store_path(&self, kind: StoreKind) -> PathBuf;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The line could not be used and was skipped (wholly or partly).
    MalformedLine,
    /// Counts did not add up and were repaired.
    QuantityInvariantViolation,
    /// A loan disagreed with the inventory and was dropped.
    CrossStoreMismatch,
    /// A loan date was missing, unreadable or out of order and was replaced.
    DateRepaired,
    /// The line used the legacy positional format and will be rewritten.
    LegacyFormat,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticKind::MalformedLine => "malformed line",
            DiagnosticKind::QuantityInvariantViolation => "quantity repaired",
            DiagnosticKind::CrossStoreMismatch => "cross-store mismatch",
            DiagnosticKind::DateRepaired => "date repaired",
            DiagnosticKind::LegacyFormat => "legacy format",
        };
        f.write_str(label)
    }
}

/// One decision taken while loading a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub store: StoreKind,
    pub kind: DiagnosticKind,
    /// 1-based line number in the store.
    pub line: usize,
    pub detail: String,
}

impl Diagnostic {
    pub(crate) fn new(
        store: StoreKind,
        kind: DiagnosticKind,
        line: usize,
        detail: impl Into<String>,
    ) -> Self {
        let diagnostic = Self {
            store,
            kind,
            line,
            detail: detail.into(),
        };
        tracing::warn!(
            store = %diagnostic.store,
            line = diagnostic.line,
            kind = %diagnostic.kind,
            "{}",
            diagnostic.detail
        );
        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line {}: {}: {}",
            self.store, self.line, self.kind, self.detail
        )
    }
}

/// Parsed store content plus what was done to it on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Loaded<T> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

/// A `MalformedLine` diagnostic if the line lost bytes to UTF-8 decoding.
pub(crate) fn undecodable(store: StoreKind, line: usize, raw: &str) -> Option<Diagnostic> {
    raw.contains(UNDECODABLE).then(|| {
        Diagnostic::new(
            store,
            DiagnosticKind::MalformedLine,
            line,
            "line is not valid UTF-8",
        )
    })
}

/// Splits a store line into trimmed fields.
pub(crate) fn split_fields(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).collect()
}
