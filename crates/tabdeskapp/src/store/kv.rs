use super::backend::{Entries, StorageBackend};
use crate::error::{DeskError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// One key/value namespace (`layout`, `preferences`, `widgets`).
///
/// Values are JSON. A value that fails to decode as the requested type reads as
/// absent, so callers fall back to their defaults instead of failing.
pub struct KvStore<B: StorageBackend> {
    backend: B,
    namespace: String,
    overlay: Option<Entries>,
}

impl<B: StorageBackend> KvStore<B> {
    pub fn new(backend: B, namespace: &str) -> Self {
        Self {
            backend,
            namespace: namespace.to_string(),
            overlay: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_degraded(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries()?.remove(key))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(value) => match serde_json::from_value(value) {
                Ok(v) => Ok(Some(v)),
                Err(e) => {
                    warn!(namespace = %self.namespace, key, error = %e, "ignoring undecodable value");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.entries()?;
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.write(entries)
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write(entries)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_keys().collect())
    }

    fn entries(&self) -> Result<Entries> {
        match &self.overlay {
            Some(entries) => Ok(entries.clone()),
            None => self.backend.load_namespace(&self.namespace),
        }
    }

    fn write(&mut self, entries: Entries) -> Result<()> {
        match self.backend.save_namespace(&self.namespace, &entries) {
            Ok(()) => {
                self.overlay = None;
                Ok(())
            }
            Err(e @ DeskError::StorageUnavailable(_)) => {
                warn!(namespace = %self.namespace, error = %e, "storage unavailable, keeping values in memory");
                self.overlay = Some(entries);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
