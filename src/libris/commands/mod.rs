use crate::config::LibrisConfig;
use crate::model::{InventoryRecord, Loan};
use std::path::PathBuf;

pub mod add;
pub mod borrow;
pub mod borrowers;
pub mod config;
pub mod delete;
pub mod doctor;
pub mod edit;
pub mod extend;
pub mod find;
pub mod give_back;
pub mod helpers;
pub mod list;
pub mod open;
pub mod paths;

pub use borrowers::{BorrowerView, LoanView};
pub use list::{ItemOrder, ItemView};
pub use open::LoadReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Inventory records created or changed by the command, as they are now.
    pub affected_items: Vec<InventoryRecord>,
    /// Loans created, extended or closed by the command.
    pub affected_loans: Vec<Loan>,
    pub listed_items: Vec<ItemView>,
    pub listed_borrowers: Vec<BorrowerView>,
    pub paths: Vec<PathBuf>,
    pub config: Option<LibrisConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed_items(mut self, items: Vec<ItemView>) -> Self {
        self.listed_items = items;
        self
    }

    pub fn with_listed_borrowers(mut self, borrowers: Vec<BorrowerView>) -> Self {
        self.listed_borrowers = borrowers;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: LibrisConfig) -> Self {
        self.config = Some(config);
        self
    }
}
