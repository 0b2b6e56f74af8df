use crate::commands::{recover, CmdMessage, CmdResult};
use crate::error::Result;
use crate::settings::{canonical_key, SettingsService};
use crate::store::StorageBackend;
use serde_json::Value;

pub fn show<B: StorageBackend>(service: &SettingsService<B>) -> Result<CmdResult> {
    Ok(CmdResult::default().with_settings(service.get().clone()))
}

/// Parse a command-line value: JSON when it parses as JSON, a plain string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn set<B: StorageBackend>(
    service: &mut SettingsService<B>,
    key: &str,
    raw: &str,
) -> Result<CmdResult> {
    let value = parse_value(raw);
    let mut result = CmdResult::default();
    match service.update(key, value.clone()) {
        Ok(_) => result.add_message(CmdMessage::success(format!("{} = {}", key, value))),
        Err(e) => recover(&mut result, e, "Setting")?,
    }
    Ok(result.with_settings(service.get().clone()))
}

pub fn toggle<B: StorageBackend>(service: &mut SettingsService<B>, key: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if let Err(e) = service.toggle(key) {
        recover(&mut result, e, "Setting")?;
    }
    let key = canonical_key(key);
    let state = service
        .get()
        .entries()
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default();
    if !state.is_empty() {
        result.add_message(CmdMessage::success(format!("{} = {}", key, state)));
    }
    Ok(result.with_settings(service.get().clone()))
}

pub fn reset<B: StorageBackend>(service: &mut SettingsService<B>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match service.reset() {
        Ok(_) => result.add_message(CmdMessage::success("Settings restored to defaults.")),
        Err(e) => recover(&mut result, e, "Setting")?,
    }
    Ok(result.with_settings(service.get().clone()))
}
