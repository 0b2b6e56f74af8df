use super::backend::StorageBackend;
use crate::error::{DeskError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// On-medium shape of one collection.
///
/// `next_id` only ever grows, so ids stay unique even after deletes and clears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionFile {
    pub schema_version: u32,
    pub next_id: u64,
    #[serde(default)]
    pub records: BTreeMap<u64, Value>,
}

impl CollectionFile {
    pub fn empty(schema_version: u32) -> Self {
        Self {
            schema_version,
            next_id: 1,
            records: BTreeMap::new(),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert<R: Record>(&mut self, record: &mut R) -> Result<u64> {
        let id = match record.record_id() {
            Some(id) => {
                if id >= self.next_id {
                    self.next_id = id + 1;
                }
                id
            }
            None => {
                let id = self.allocate_id();
                record.assign_id(id);
                id
            }
        };
        self.records.insert(id, serde_json::to_value(&*record)?);
        Ok(id)
    }
}

/// A record type the store can assign identifiers to.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn record_id(&self) -> Option<u64>;
    fn assign_id(&mut self, id: u64);
}

/// Handle returned by [`RecordStore::open_collection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: String,
    schema_version: u32,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// CRUD over named collections of records.
///
/// Each write replaces the whole collection through the backend's atomic save,
/// which is what makes [`RecordStore::put_many`] all-or-nothing for readers.
///
/// When the backend refuses a write the intended state is kept in an in-memory
/// overlay: the call still reports [`DeskError::StorageUnavailable`], but every
/// later read in this process sees the overlay, so the session keeps working.
pub struct RecordStore<B: StorageBackend> {
    backend: B,
    overlay: HashMap<String, CollectionFile>,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            overlay: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True once any write had to fall back to memory.
    pub fn is_degraded(&self) -> bool {
        !self.overlay.is_empty()
    }

    /// Open (creating on first use) a collection of `R` records.
    ///
    /// Opening an existing collection at the same or an older version is a no-op.
    /// On a version bump, records that no longer deserialize into `R` are dropped
    /// and the rest are kept as they are.
    pub fn open_collection<R: Record>(
        &mut self,
        name: &str,
        schema_version: u32,
    ) -> Result<Collection> {
        let handle = Collection {
            name: name.to_string(),
            schema_version,
        };

        match self.stored(name)? {
            None => {
                debug!(collection = name, schema_version, "creating collection");
                self.write_tolerant(name, CollectionFile::empty(schema_version))?;
            }
            Some(mut file) if file.schema_version < schema_version => {
                let before = file.records.len();
                file.records
                    .retain(|_, value| serde_json::from_value::<R>(value.clone()).is_ok());
                let dropped = before - file.records.len();
                info!(
                    collection = name,
                    from = file.schema_version,
                    to = schema_version,
                    dropped,
                    "migrated collection"
                );
                file.schema_version = schema_version;
                self.write_tolerant(name, file)?;
            }
            Some(_) => {}
        }

        Ok(handle)
    }

    /// Every record, in id order. Records that no longer match `R` are skipped.
    pub fn get_all<R: Record>(&self, collection: &Collection) -> Result<Vec<R>> {
        let file = self.load(collection)?;
        let mut records = Vec::with_capacity(file.records.len());
        for (id, value) in file.records {
            match serde_json::from_value::<R>(value) {
                Ok(mut record) => {
                    if record.record_id().is_none() {
                        record.assign_id(id);
                    }
                    records.push(record);
                }
                Err(e) => warn!(collection = collection.name(), id, error = %e, "skipping malformed record"),
            }
        }
        Ok(records)
    }

    pub fn get<R: Record>(&self, collection: &Collection, id: u64) -> Result<R> {
        let file = self.load(collection)?;
        let value = file
            .records
            .get(&id)
            .cloned()
            .ok_or(DeskError::RecordNotFound(id))?;
        let mut record: R = serde_json::from_value(value)?;
        if record.record_id().is_none() {
            record.assign_id(id);
        }
        Ok(record)
    }

    /// Upsert one record. Records without an id get a fresh one written back into them.
    pub fn put<R: Record>(&mut self, collection: &Collection, record: &mut R) -> Result<u64> {
        let mut file = self.load(collection)?;
        let id = file.insert(record)?;
        self.write(collection.name(), file)?;
        Ok(id)
    }

    /// Upsert a batch in a single write.
    pub fn put_many<R: Record>(
        &mut self,
        collection: &Collection,
        records: &mut [R],
    ) -> Result<Vec<u64>> {
        let mut file = self.load(collection)?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            ids.push(file.insert(record)?);
        }
        self.write(collection.name(), file)?;
        Ok(ids)
    }

    /// Remove every record and insert `records` in the same write.
    pub fn replace_all<R: Record>(
        &mut self,
        collection: &Collection,
        records: &mut [R],
    ) -> Result<Vec<u64>> {
        let mut file = self.load(collection)?;
        file.records.clear();
        let mut ids = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            ids.push(file.insert(record)?);
        }
        self.write(collection.name(), file)?;
        Ok(ids)
    }

    /// Delete by id. Deleting a missing id is not an error.
    pub fn delete(&mut self, collection: &Collection, id: u64) -> Result<()> {
        let mut file = self.load(collection)?;
        if file.records.remove(&id).is_none() {
            debug!(collection = collection.name(), id, "delete of missing record ignored");
            return Ok(());
        }
        self.write(collection.name(), file)
    }

    /// Remove every record, keeping the id counter. Returns how many were removed.
    pub fn clear(&mut self, collection: &Collection) -> Result<usize> {
        let mut file = self.load(collection)?;
        let removed = file.records.len();
        file.records.clear();
        self.write(collection.name(), file)?;
        Ok(removed)
    }

    fn stored(&self, name: &str) -> Result<Option<CollectionFile>> {
        if let Some(file) = self.overlay.get(name) {
            return Ok(Some(file.clone()));
        }
        self.backend.load_collection(name)
    }

    fn load(&self, collection: &Collection) -> Result<CollectionFile> {
        Ok(self
            .stored(collection.name())?
            .unwrap_or_else(|| CollectionFile::empty(collection.schema_version())))
    }

    fn write(&mut self, name: &str, file: CollectionFile) -> Result<()> {
        match self.backend.save_collection(name, &file) {
            Ok(()) => {
                self.overlay.remove(name);
                Ok(())
            }
            Err(e @ DeskError::StorageUnavailable(_)) => {
                warn!(collection = name, error = %e, "storage unavailable, keeping collection in memory");
                self.overlay.insert(name.to_string(), file);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Like `write`, but an unavailable medium is not reported: the overlay carries on.
    fn write_tolerant(&mut self, name: &str, file: CollectionFile) -> Result<()> {
        match self.write(name, file) {
            Err(DeskError::StorageUnavailable(_)) => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, ChapterId};
    use crate::store::mem_backend::MemBackend;

    fn open(store: &mut RecordStore<MemBackend>) -> Collection {
        store.open_collection::<Chapter>("chapters", 1).unwrap()
    }

    #[test]
    fn put_assigns_increasing_ids() {
        let mut store = RecordStore::new(MemBackend::new());
        let col = open(&mut store);

        let mut a = Chapter::seeded("Physics", "Class 11", "Units");
        let mut b = Chapter::seeded("Physics", "Class 11", "Waves");
        let id_a = store.put(&col, &mut a).unwrap();
        let id_b = store.put(&col, &mut b).unwrap();

        assert_eq!(id_a, 1);
        assert_eq!(id_b, 2);
        assert_eq!(a.id, Some(ChapterId(1)));
    }

    #[test]
    fn put_then_get_all_round_trips() {
        let mut store = RecordStore::new(MemBackend::new());
        let col = open(&mut store);

        let mut ch = Chapter::custom("Biology", "NEET", "Genetics");
        ch.done = true;
        ch.total_revisions = 7;
        ch.revisions = vec![
            "2026-03-01T09:00:00Z".parse().unwrap(),
            "2026-04-05T09:00:00Z".parse().unwrap(),
        ];
        store.put(&col, &mut ch).unwrap();

        let all: Vec<Chapter> = store.get_all(&col).unwrap();
        assert_eq!(all, vec![ch]);
    }

    #[test]
    fn put_with_id_replaces_existing() {
        let mut store = RecordStore::new(MemBackend::new());
        let col = open(&mut store);

        let mut ch = Chapter::seeded("Physics", "Class 11", "Units");
        store.put(&col, &mut ch).unwrap();
        ch.name = "Units and Measurement".into();
        store.put(&col, &mut ch).unwrap();

        let all: Vec<Chapter> = store.get_all(&col).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Units and Measurement");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = RecordStore::new(MemBackend::new());
        let col = open(&mut store);
        let mut ch = Chapter::seeded("Physics", "Class 11", "Units");
        let id = store.put(&col, &mut ch).unwrap();

        store.delete(&col, id).unwrap();
        store.delete(&col, id).unwrap();
        assert!(store.get_all::<Chapter>(&col).unwrap().is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut store = RecordStore::new(MemBackend::new());
        let col = open(&mut store);
        let mut batch = vec![
            Chapter::seeded("Physics", "Class 11", "A"),
            Chapter::seeded("Physics", "Class 11", "B"),
        ];
        store.put_many(&col, &mut batch).unwrap();
        assert_eq!(store.clear(&col).unwrap(), 2);

        let mut ch = Chapter::seeded("Physics", "Class 11", "C");
        assert_eq!(store.put(&col, &mut ch).unwrap(), 3);
    }

    #[test]
    fn put_many_is_a_single_write() {
        let backend = MemBackend::new();
        let mut store = RecordStore::new(backend.clone());
        let col = open(&mut store);
        let before = backend.write_count();

        let mut batch: Vec<Chapter> = (0..10)
            .map(|i| Chapter::seeded("Maths", "Class 12", &format!("Topic {}", i)))
            .collect();
        let ids = store.put_many(&col, &mut batch).unwrap();

        assert_eq!(ids.len(), 10);
        assert_eq!(backend.write_count(), before + 1);
    }

    #[test]
    fn reopening_is_a_noop() {
        let backend = MemBackend::new();
        let mut store = RecordStore::new(backend.clone());
        let col = open(&mut store);
        let mut ch = Chapter::seeded("Physics", "Class 11", "Units");
        store.put(&col, &mut ch).unwrap();

        let writes = backend.write_count();
        let again = open(&mut store);
        assert_eq!(again, col);
        assert_eq!(backend.write_count(), writes);
        assert_eq!(store.get_all::<Chapter>(&col).unwrap().len(), 1);
    }

    #[test]
    fn version_bump_keeps_matching_records_and_drops_the_rest() {
        let backend = MemBackend::new();
        let mut file = CollectionFile::empty(1);
        file.records.insert(
            1,
            serde_json::json!({"id": 1, "subject": "Physics Class 11", "name": "Units"}),
        );
        file.records
            .insert(2, serde_json::json!({"id": 2, "title": "not a chapter"}));
        file.next_id = 3;
        backend.save_collection("chapters", &file).unwrap();

        let mut store = RecordStore::new(backend.clone());
        let col = store.open_collection::<Chapter>("chapters", 2).unwrap();

        let all: Vec<Chapter> = store.get_all(&col).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Units");
        let stored = backend.load_collection("chapters").unwrap().unwrap();
        assert_eq!(stored.schema_version, 2);
        assert_eq!(stored.next_id, 3);
    }

    #[test]
    fn failed_write_keeps_state_in_memory() {
        let backend = MemBackend::new();
        let mut store = RecordStore::new(backend.clone());
        let col = open(&mut store);

        backend.set_simulate_write_error(true);
        let mut ch = Chapter::seeded("Physics", "Class 11", "Units");
        let err = store.put(&col, &mut ch).unwrap_err();
        assert!(err.is_storage_unavailable());
        assert!(store.is_degraded());

        let all: Vec<Chapter> = store.get_all(&col).unwrap();
        assert_eq!(all.len(), 1);
        assert!(backend.load_collection("chapters").unwrap().unwrap().records.is_empty());

        backend.set_simulate_write_error(false);
        let mut other = Chapter::seeded("Physics", "Class 11", "Waves");
        store.put(&col, &mut other).unwrap();
        assert!(!store.is_degraded());
        assert_eq!(
            backend.load_collection("chapters").unwrap().unwrap().records.len(),
            2
        );
    }

    #[test]
    fn get_missing_is_record_not_found() {
        let mut store = RecordStore::new(MemBackend::new());
        let col = open(&mut store);
        match store.get::<Chapter>(&col, 42) {
            Err(DeskError::RecordNotFound(42)) => {}
            other => panic!("expected RecordNotFound, got {:?}", other),
        }
    }
}
