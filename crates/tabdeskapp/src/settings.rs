//! # General Settings
//!
//! Dashboard preferences live as one JSON object under `generalSettings` in the
//! `preferences` namespace. [`SettingsService`] keeps a cached copy, writes it
//! back on every change and tells subscribers about it.
//!
//! Persisted values are merged over [`Settings::default`] key by key: unknown keys
//! and values of the wrong type are ignored instead of throwing away the whole
//! object. Two keys keep their historical snake_case names (`global_search`,
//! `hide_lock_icon`) so existing data stays readable.
//!
//! Other processes may change the same file. [`SettingsService::sync`] re-reads it
//! and, if it differs from the cache, replaces the cache and notifies subscribers.

use crate::error::{DeskError, Result};
use crate::store::{KvStore, StorageBackend};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const PREFERENCES_NAMESPACE: &str = "preferences";
pub const SETTINGS_KEY: &str = "generalSettings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub show_background: bool,
    pub show_border: bool,
    pub show_appbar: bool,
    pub show_time_date: bool,
    pub show_todo_list: bool,
    #[serde(rename = "global_search", alias = "globalSearch")]
    pub global_search: bool,
    #[serde(rename = "hide_lock_icon", alias = "hideLockIcon")]
    pub hide_lock_icon: bool,
    pub wallpaper_dimming: u32,
    pub playback_rate: f64,
    pub theme: String,
    pub accent_color: String,
    pub auto_change_wallpaper: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_background: true,
            show_border: true,
            show_appbar: true,
            show_time_date: true,
            show_todo_list: false,
            global_search: false,
            hide_lock_icon: true,
            wallpaper_dimming: 32,
            playback_rate: 2.0,
            theme: "dark".to_string(),
            accent_color: "#3b82f6".to_string(),
            auto_change_wallpaper: false,
        }
    }
}

impl Settings {
    fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Overlay `persisted` onto the defaults, keeping only keys that still fit.
    pub fn merged(persisted: &Value) -> Self {
        let mut merged = Self::default().to_map();
        if let Value::Object(fields) = persisted {
            for (key, value) in fields {
                let key = canonical_key(key);
                if !merged.contains_key(key) {
                    debug!(key, "ignoring unknown setting");
                    continue;
                }
                let mut candidate = merged.clone();
                candidate.insert(key.to_string(), value.clone());
                if serde_json::from_value::<Settings>(Value::Object(candidate)).is_ok() {
                    merged.insert(key.to_string(), value.clone());
                } else {
                    debug!(key, "ignoring setting with wrong type");
                }
            }
        }
        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    /// Every key with its current value, in serialized form.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.to_map().into_iter().collect()
    }
}

pub(crate) fn canonical_key(key: &str) -> &str {
    match key {
        "globalSearch" => "global_search",
        "hideLockIcon" => "hide_lock_icon",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Settings)>;

pub struct SettingsService<B: StorageBackend> {
    kv: KvStore<B>,
    cache: Settings,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<B: StorageBackend> SettingsService<B> {
    /// Read persisted settings and merge them over the defaults.
    pub fn load(backend: B) -> Result<Self> {
        let kv = KvStore::new(backend, PREFERENCES_NAMESPACE);
        let cache = Self::read(&kv)?;
        Ok(Self {
            kv,
            cache,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    fn read(kv: &KvStore<B>) -> Result<Settings> {
        Ok(kv
            .get_raw(SETTINGS_KEY)?
            .map(|value| Settings::merged(&value))
            .unwrap_or_default())
    }

    pub fn get(&self) -> &Settings {
        &self.cache
    }

    pub fn is_degraded(&self) -> bool {
        self.kv.is_degraded()
    }

    pub fn save(&mut self) -> Result<()> {
        self.kv.set(SETTINGS_KEY, &self.cache)
    }

    /// Set one key. The value must have the type the key already has.
    pub fn update(&mut self, key: &str, value: Value) -> Result<&Settings> {
        let key = canonical_key(key);
        let mut fields = self.cache.to_map();
        if !fields.contains_key(key) {
            return Err(DeskError::UnknownSetting(key.to_string()));
        }
        fields.insert(key.to_string(), value.clone());
        let updated: Settings = serde_json::from_value(Value::Object(fields)).map_err(|_| {
            DeskError::InvalidInput(format!("{} cannot be set to {}", key, value))
        })?;
        info!(key, %value, "setting updated");
        self.replace(updated)
    }

    /// Flip a boolean key.
    pub fn toggle(&mut self, key: &str) -> Result<&Settings> {
        let key = canonical_key(key);
        match self.cache.to_map().get(key) {
            Some(Value::Bool(current)) => {
                let flipped = !*current;
                self.update(key, Value::Bool(flipped))
            }
            Some(_) => Err(DeskError::InvalidInput(format!("{} is not a toggle", key))),
            None => Err(DeskError::UnknownSetting(key.to_string())),
        }
    }

    pub fn reset(&mut self) -> Result<&Settings> {
        info!("settings reset to defaults");
        self.replace(Settings::default())
    }

    /// Change the cache, notify, then persist. The cache keeps the change even if
    /// persisting fails.
    fn replace(&mut self, settings: Settings) -> Result<&Settings> {
        self.cache = settings;
        self.notify();
        self.save()?;
        Ok(&self.cache)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Settings) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Pick up changes another process made. Returns true if the cache changed.
    pub fn sync(&mut self) -> Result<bool> {
        let persisted = Self::read(&self.kv)?;
        if persisted == self.cache {
            return Ok(false);
        }
        debug!("settings changed elsewhere, replacing cache");
        self.cache = persisted;
        self.notify();
        Ok(true)
    }

    fn notify(&mut self) {
        let settings = self.cache.clone();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&settings);
        }
    }
}
