use super::backend::{Entries, StorageBackend};
use super::records::CollectionFile;
use crate::error::{DeskError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const COLLECTIONS_DIR: &str = "collections";
const KV_DIR: &str = "kv";
const MEDIA_DIR: &str = "media";

/// Filesystem backend rooted at one data directory.
///
/// ```text
/// <root>/
/// ├── collections/chapters.json
/// ├── kv/layout.json
/// ├── kv/preferences.json
/// └── media/current-video.bin
/// ```
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(COLLECTIONS_DIR).join(format!("{}.json", name))
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.root.join(KV_DIR).join(format!("{}.json", namespace))
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(MEDIA_DIR).join(format!("{}.bin", slot))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| unavailable(path, e))?;
        }
        Ok(())
    }

    /// Write to a uniquely named sibling then rename over the target.
    fn atomic_write(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let dir = target
            .parent()
            .ok_or_else(|| DeskError::StorageUnavailable(format!("{}", target.display())))?;
        self.ensure_dir(dir)?;

        let tmp = dir.join(format!(".write-{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(unavailable(target, e));
        }
        fs::rename(&tmp, target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            unavailable(target, e)
        })?;

        debug!(path = %target.display(), bytes = bytes.len(), "wrote file");
        Ok(())
    }

    fn read_optional(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            // A root that cannot exist holds nothing; writes will report it.
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(e) => Err(DeskError::Io(e)),
        }
    }
}

fn unavailable(path: &Path, err: io::Error) -> DeskError {
    DeskError::StorageUnavailable(format!("{}: {}", path.display(), err))
}

impl StorageBackend for FsBackend {
    fn load_collection(&self, name: &str) -> Result<Option<CollectionFile>> {
        match self.read_optional(&self.collection_path(name))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save_collection(&self, name: &str, file: &CollectionFile) -> Result<()> {
        let content = serde_json::to_vec_pretty(file)?;
        self.atomic_write(&self.collection_path(name), &content)
    }

    fn load_namespace(&self, namespace: &str) -> Result<Entries> {
        match self.read_optional(&self.namespace_path(namespace))? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Entries::new()),
        }
    }

    fn save_namespace(&self, namespace: &str, entries: &Entries) -> Result<()> {
        let content = serde_json::to_vec_pretty(entries)?;
        self.atomic_write(&self.namespace_path(namespace), &content)
    }

    fn read_slot(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        self.read_optional(&self.slot_path(slot))
    }

    fn write_slot(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        self.atomic_write(&self.slot_path(slot), bytes)
    }

    fn delete_slot(&self, slot: &str) -> Result<()> {
        let path = self.slot_path(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(&path, e)),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
