use crate::commands::{CmdMessage, CmdResult};
use crate::config::LibrisConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

/// Reads or updates config.json in `data_dir`.
///
/// Unknown keys and bad values come back as error messages, not errors: the
/// session itself is fine.
pub fn run(data_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    let mut config = LibrisConfig::load(data_dir)?;
    let mut result = CmdResult::default();
    match action {
        ConfigAction::ShowAll => Ok(result.with_config(config)),
        ConfigAction::ShowKey(key) => {
            match config.get(&key) {
                Some(value) => result.add_message(CmdMessage::info(value)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            if let Err(e) = config.set(&key, &value) {
                result.add_message(CmdMessage::error(e.to_string()));
                return Ok(result);
            }
            config.save(data_dir)?;
            tracing::info!(key = %key, "config updated");
            let display = config.get(&key).unwrap_or(value);
            result.add_message(CmdMessage::success(format!("{} set to {}", key, display)));
            Ok(result.with_config(config))
        }
    }
}
