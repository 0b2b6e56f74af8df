use crate::commands::{CmdMessage, CmdResult};
use crate::config::{default_config_path, DeskConfig};
use crate::error::Result;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    /// Where the config file is looked up.
    Path,
    /// A commented `tabdesk.toml` listing every key with its default.
    Template,
}

pub fn run(config: &DeskConfig, action: ConfigAction) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match action {
        ConfigAction::ShowAll => return Ok(result.with_config(config.clone())),
        ConfigAction::ShowKey(key) => match serde_json::to_value(config)?.get(&key) {
            Some(Value::Null) => result.add_message(CmdMessage::info("(unset)")),
            Some(Value::String(s)) => result.add_message(CmdMessage::info(s.clone())),
            Some(other) => result.add_message(CmdMessage::info(other.to_string())),
            None => result.add_message(CmdMessage::error(format!("Unknown config key: {}", key))),
        },
        ConfigAction::Path => match default_config_path() {
            Some(path) => result.add_message(CmdMessage::info(path.display().to_string())),
            None => result.add_message(CmdMessage::warning(
                "No config directory could be determined for this platform.",
            )),
        },
        ConfigAction::Template => {
            let template = confique::toml::template::<DeskConfig>(
                confique::toml::FormatOptions::default(),
            );
            result.add_message(CmdMessage::info(template));
        }
    }
    Ok(result)
}
