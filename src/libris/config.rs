use crate::error::{LibrisError, Result};
use crate::model::LoanPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_INVENTORY_FILE: &str = "inventory.txt";
const DEFAULT_LEDGER_FILE: &str = "ledger.txt";

/// Keys accepted by [`LibrisConfig::get`] and [`LibrisConfig::set`], in display order.
pub const CONFIG_KEYS: &[&str] = &[
    "inventory_file",
    "ledger_file",
    "loan_days",
    "extension_days",
    "max_copies",
    "allow_repeat_loans",
];

/// Configuration for libris, stored as config.json in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrisConfig {
    /// Inventory store file name, relative to the data directory
    #[serde(default = "default_inventory_file")]
    pub inventory_file: String,

    #[serde(default = "default_ledger_file")]
    pub ledger_file: String,

    /// Length of a new loan, in days
    #[serde(default = "default_loan_days")]
    pub loan_days: u32,

    #[serde(default = "default_extension_days")]
    pub extension_days: u32,

    /// Upper bound for the copies of a single title
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,

    #[serde(default)]
    pub allow_repeat_loans: bool,
}

fn default_inventory_file() -> String {
    DEFAULT_INVENTORY_FILE.to_string()
}

fn default_ledger_file() -> String {
    DEFAULT_LEDGER_FILE.to_string()
}

fn default_loan_days() -> u32 {
    LoanPolicy::default().loan_days
}

fn default_extension_days() -> u32 {
    LoanPolicy::default().extension_days
}

fn default_max_copies() -> u32 {
    LoanPolicy::default().max_copies
}

impl Default for LibrisConfig {
    fn default() -> Self {
        Self {
            inventory_file: default_inventory_file(),
            ledger_file: default_ledger_file(),
            loan_days: default_loan_days(),
            extension_days: default_extension_days(),
            max_copies: default_max_copies(),
            allow_repeat_loans: false,
        }
    }
}

impl LibrisConfig {
    pub fn path<P: AsRef<Path>>(config_dir: P) -> PathBuf {
        config_dir.as_ref().join(CONFIG_FILENAME)
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = Self::path(config_dir);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: LibrisConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Applies the rules of [`LibrisConfig::set`] to values read from disk.
    fn validate(&self) -> Result<()> {
        file_name("inventory_file", &self.inventory_file)?;
        file_name("ledger_file", &self.ledger_file)?;
        for (key, value) in [
            ("loan_days", self.loan_days),
            ("extension_days", self.extension_days),
            ("max_copies", self.max_copies),
        ] {
            positive_number(key, &value.to_string())?;
        }
        Ok(())
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = Self::path(config_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn policy(&self) -> LoanPolicy {
        LoanPolicy {
            loan_days: self.loan_days,
            extension_days: self.extension_days,
            max_copies: self.max_copies,
            allow_repeat_loans: self.allow_repeat_loans,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "inventory_file" => self.inventory_file.clone(),
            "ledger_file" => self.ledger_file.clone(),
            "loan_days" => self.loan_days.to_string(),
            "extension_days" => self.extension_days.to_string(),
            "max_copies" => self.max_copies.to_string(),
            "allow_repeat_loans" => self.allow_repeat_loans.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "inventory_file" => self.inventory_file = file_name(key, value)?,
            "ledger_file" => self.ledger_file = file_name(key, value)?,
            "loan_days" => self.loan_days = positive_number(key, value)?,
            "extension_days" => self.extension_days = positive_number(key, value)?,
            "max_copies" => self.max_copies = positive_number(key, value)?,
            "allow_repeat_loans" => {
                self.allow_repeat_loans = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(LibrisError::Config(format!(
                            "{} must be true or false, got '{}'",
                            key, value
                        )))
                    }
                }
            }
            _ => return Err(LibrisError::Config(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }

    /// Every key with its current value, in [`CONFIG_KEYS`] order.
    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

fn file_name(key: &str, value: &str) -> Result<String> {
    if value.is_empty() || value.contains(['/', '\\']) {
        return Err(LibrisError::Config(format!(
            "{} must be a plain file name, got '{}'",
            key, value
        )));
    }
    Ok(value.to_string())
}

/// Positive integer settings.
fn positive_number(key: &str, value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LibrisError::Config(format!(
            "{} must be a positive whole number, got '{}'",
            key, value
        ))),
    }
}
