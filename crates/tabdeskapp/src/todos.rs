//! The to-do widget's list, stored as one array under `todoListData`.
//!
//! Entries that do not decode as a [`Todo`] are skipped when listing but kept,
//! in place, whenever the list is written back.

use crate::error::{DeskError, Result};
use crate::model::Todo;
use crate::store::{KvStore, StorageBackend};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

pub const WIDGETS_NAMESPACE: &str = "widgets";
pub const TODOS_KEY: &str = "todoListData";

pub struct TodoList<B: StorageBackend> {
    kv: KvStore<B>,
}

impl<B: StorageBackend> TodoList<B> {
    pub fn new(backend: B) -> Self {
        Self {
            kv: KvStore::new(backend, WIDGETS_NAMESPACE),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.kv.is_degraded()
    }

    pub fn list(&self) -> Result<Vec<Todo>> {
        Ok(self.load()?.into_iter().filter_map(Entry::into_todo).collect())
    }

    /// Append a todo. Its id is the creation time in milliseconds, bumped until unique.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Result<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DeskError::InvalidInput("todo text cannot be empty".to_string()));
        }
        let mut entries = self.load()?;
        let mut id = now.timestamp_millis();
        while entries.iter().any(|e| e.todo().is_some_and(|t| t.id == id)) {
            id += 1;
        }
        let todo = Todo {
            id,
            text: text.to_string(),
            done: false,
        };
        entries.push(Entry::Todo(todo.clone()));
        self.save(&entries)?;
        Ok(todo)
    }

    pub fn toggle(&mut self, id: i64) -> Result<Todo> {
        let mut entries = self.load()?;
        let todo = entries
            .iter_mut()
            .find_map(|e| match e {
                Entry::Todo(t) if t.id == id => Some(t),
                _ => None,
            })
            .ok_or(DeskError::RecordNotFound(id as u64))?;
        todo.done = !todo.done;
        let toggled = todo.clone();
        self.save(&entries)?;
        Ok(toggled)
    }

    /// Returns false if there was no such todo.
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.todo().map_or(true, |t| t.id != id));
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }

    /// Drop every finished todo. Returns how many were removed.
    pub fn clear_done(&mut self) -> Result<usize> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.todo().map_or(true, |t| !t.done));
        let removed = before - entries.len();
        if removed > 0 {
            self.save(&entries)?;
        }
        Ok(removed)
    }

    /// The stored array, entry by entry. A value that is not an array is an
    /// error, so nothing gets written over data that could not be read.
    fn load(&self) -> Result<Vec<Entry>> {
        let Some(raw) = self.kv.get_raw(TODOS_KEY)? else {
            return Ok(Vec::new());
        };
        let items: Vec<Value> = serde_json::from_value(raw)?;
        Ok(items
            .into_iter()
            .map(|item| match serde_json::from_value::<Todo>(item.clone()) {
                Ok(todo) => Entry::Todo(todo),
                Err(e) => {
                    warn!(error = %e, "keeping undecodable todo as is");
                    Entry::Raw(item)
                }
            })
            .collect())
    }

    fn save(&mut self, entries: &[Entry]) -> Result<()> {
        debug!(count = entries.len(), "saving todos");
        let items = entries
            .iter()
            .map(|e| match e {
                Entry::Todo(todo) => serde_json::to_value(todo),
                Entry::Raw(value) => Ok(value.clone()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.kv.set(TODOS_KEY, &items)
    }
}

enum Entry {
    Todo(Todo),
    Raw(Value),
}

impl Entry {
    fn todo(&self) -> Option<&Todo> {
        match self {
            Entry::Todo(todo) => Some(todo),
            Entry::Raw(_) => None,
        }
    }

    fn into_todo(self) -> Option<Todo> {
        match self {
            Entry::Todo(todo) => Some(todo),
            Entry::Raw(_) => None,
        }
    }
}
