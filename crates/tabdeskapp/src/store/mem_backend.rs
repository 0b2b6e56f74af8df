use super::backend::{Entries, StorageBackend};
use super::records::CollectionFile;
use crate::error::{DeskError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
struct MemState {
    collections: RefCell<HashMap<String, CollectionFile>>,
    namespaces: RefCell<HashMap<String, Entries>>,
    slots: RefCell<HashMap<String, Vec<u8>>>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since tabdesk is single-threaded.
/// Clones share state, so several stores built from one backend see each
/// other's writes the way they would on disk.
#[derive(Clone, Default)]
pub struct MemBackend {
    state: Rc<MemState>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing degraded storage.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.state.simulate_write_error.set(simulate);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.writes.get()
    }

    fn check_writable(&self) -> Result<()> {
        if self.state.simulate_write_error.get() {
            return Err(DeskError::StorageUnavailable(
                "Simulated write error".to_string(),
            ));
        }
        self.state.writes.set(self.state.writes.get() + 1);
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_collection(&self, name: &str) -> Result<Option<CollectionFile>> {
        Ok(self.state.collections.borrow().get(name).cloned())
    }

    fn save_collection(&self, name: &str, file: &CollectionFile) -> Result<()> {
        self.check_writable()?;
        self.state
            .collections
            .borrow_mut()
            .insert(name.to_string(), file.clone());
        Ok(())
    }

    fn load_namespace(&self, namespace: &str) -> Result<Entries> {
        Ok(self
            .state
            .namespaces
            .borrow()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    fn save_namespace(&self, namespace: &str, entries: &Entries) -> Result<()> {
        self.check_writable()?;
        self.state
            .namespaces
            .borrow_mut()
            .insert(namespace.to_string(), entries.clone());
        Ok(())
    }

    fn read_slot(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.slots.borrow().get(slot).cloned())
    }

    fn write_slot(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.state
            .slots
            .borrow_mut()
            .insert(slot.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete_slot(&self, slot: &str) -> Result<()> {
        self.check_writable()?;
        self.state.slots.borrow_mut().remove(slot);
        Ok(())
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}
