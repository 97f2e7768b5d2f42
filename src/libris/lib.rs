//! # Libris Architecture
//!
//! Libris is a **small lending library** kept in two plain text files: an
//! inventory of titles with their copy counts, and a ledger of who borrowed
//! what and when it is due. The files are meant to survive hand edits, stale
//! copies and half-finished writes, so most of the interesting code is about
//! loading them defensively and keeping them consistent with each other.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - Reads the clock, installs the log subscriber             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the session: Library, LoanPolicy, LoadReport        │
//! │  - Normalizes inputs (positions vs. titles)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, reconcile.rs)                │
//! │  - Lending rules, validation, reconciliation                │
//! │  - Every mutation rewrites the store(s) it touched          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Line codecs for the inventory and the ledger             │
//! │  - StorageBackend: FileStore (production), InMemoryStore    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Flow
//!
//! 1. `commands::open` parses both stores. Bad lines are skipped or repaired
//!    and each decision becomes a [`store::Diagnostic`]; nothing is written.
//! 2. [`reconcile::reconcile`] makes every record's `borrowed` count agree
//!    with the ledger.
//! 3. `commands::doctor::heal` rewrites the stores that needed repair.
//! 4. One command runs and rewrites what it changed.
//!
//! ## Slots and Positions
//!
//! Loans reference records through a stable [`model::SlotId`], never through
//! the record's position, so deleting a record does not redirect other loans.
//! Files in the older positional format are migrated on load: a legacy
//! record's slot id is its position, which keeps legacy ledgers valid.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward (API, commands, storage), code:
//! - Takes regular Rust function arguments, including `today`
//! - Returns regular Rust types (`Result<CmdResult>`)
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//!
//! ## Testing Strategy
//!
//! 1. **Commands** (`commands/*.rs`): unit tests against `InMemoryStore`,
//!    including write counts to prove failed operations write nothing.
//! 2. **Stores** (`store/*.rs`): parser edge cases and the file backend on a
//!    temp dir.
//! 3. **API** (`api.rs`): whole lending scenarios through the facade.
//! 4. **CLI** (`tests/`): the binary end to end against a temp data dir.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`library`]: The in-memory state and item lookup
//! - [`reconcile`]: Inventory/ledger count reconciliation
//! - [`store`]: Storage abstraction, line codecs and backends
//! - [`model`]: Core data types (`InventoryRecord`, `Loan`, `Borrower`, `LoanPolicy`)
//! - [`config`]: Configuration management
//! - [`init`]: Data directory resolution and session bootstrap
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod library;
pub mod model;
pub mod reconcile;
pub mod store;
