use super::records::CollectionFile;
use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Entries of one key/value namespace, sorted so files diff cleanly.
pub type Entries = BTreeMap<String, Value>;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while the stores handle the "what" (ids, overlays, replace-on-write).
///
/// Every method takes `&self`; backends are cheap handles that several stores
/// can hold at once (clones share the same underlying medium).
pub trait StorageBackend: Clone {
    // --- Record Collections ---

    /// Load a whole collection. `Ok(None)` when it was never created.
    fn load_collection(&self, name: &str) -> Result<Option<CollectionFile>>;

    /// Replace a whole collection.
    /// MUST be atomic (e.g. write to tmp then rename): readers see the old or the
    /// new collection, never a partial batch.
    fn save_collection(&self, name: &str, file: &CollectionFile) -> Result<()>;

    // --- Key/Value Namespaces ---

    /// Load every entry of a namespace. Missing namespaces are empty.
    fn load_namespace(&self, namespace: &str) -> Result<Entries>;

    /// Replace every entry of a namespace (atomic, as above).
    fn save_namespace(&self, namespace: &str, entries: &Entries) -> Result<()>;

    // --- Media Slots ---

    /// Read a binary slot. `Ok(None)` when the slot is empty.
    fn read_slot(&self, slot: &str) -> Result<Option<Vec<u8>>>;

    /// Write a binary slot (atomic).
    fn write_slot(&self, slot: &str, bytes: &[u8]) -> Result<()>;

    /// Empty a slot. Emptying an empty slot is not an error.
    fn delete_slot(&self, slot: &str) -> Result<()>;

    // --- Diagnostics ---

    /// Human readable description of where data lives.
    fn location(&self) -> String;
}
