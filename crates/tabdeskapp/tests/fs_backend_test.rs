use serde_json::json;
use std::fs;
use std::path::Path;
use tabdeskapp::store::{CollectionFile, FsBackend, StorageBackend};
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().to_path_buf());
    (dir, backend)
}

fn assert_no_tmp_files(dir: &Path) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_missing_data_reads_as_empty() {
    let (_dir, backend) = setup();
    assert!(backend.load_collection("chapters").unwrap().is_none());
    assert!(backend.load_namespace("layout").unwrap().is_empty());
    assert!(backend.read_slot("current-video").unwrap().is_none());
}

#[test]
fn test_collection_round_trip_and_layout() {
    let (dir, backend) = setup();
    let mut file = CollectionFile::empty(11);
    file.next_id = 3;
    file.records.insert(1, json!({"id": 1, "name": "Units"}));
    file.records.insert(2, json!({"id": 2, "name": "Waves"}));

    backend.save_collection("chapters", &file).unwrap();

    let path = dir.path().join("collections").join("chapters.json");
    assert!(path.exists());
    let loaded = backend.load_collection("chapters").unwrap().unwrap();
    assert_eq!(loaded, file);
    assert_no_tmp_files(&dir.path().join("collections"));
}

#[test]
fn test_namespace_overwrite_is_whole_file() {
    let (dir, backend) = setup();
    let mut entries = tabdeskapp::store::backend::Entries::new();
    entries.insert("a".into(), json!(1));
    entries.insert("b".into(), json!(2));
    backend.save_namespace("layout", &entries).unwrap();

    entries.remove("a");
    backend.save_namespace("layout", &entries).unwrap();

    let loaded = backend.load_namespace("layout").unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get("b"), Some(&json!(2)));
    assert_no_tmp_files(&dir.path().join("kv"));
}

#[test]
fn test_slots_write_and_delete() {
    let (dir, backend) = setup();
    backend.write_slot("current-video", &[0, 1, 2, 3]).unwrap();
    assert_eq!(
        backend.read_slot("current-video").unwrap(),
        Some(vec![0, 1, 2, 3])
    );
    assert!(dir.path().join("media").join("current-video.bin").exists());

    backend.delete_slot("current-video").unwrap();
    backend.delete_slot("current-video").unwrap();
    assert!(backend.read_slot("current-video").unwrap().is_none());
}

#[test]
fn test_corrupt_collection_is_an_error() {
    let (dir, backend) = setup();
    let collections = dir.path().join("collections");
    fs::create_dir_all(&collections).unwrap();
    fs::write(collections.join("chapters.json"), "{not json").unwrap();
    assert!(backend.load_collection("chapters").is_err());
}

#[test]
fn test_unwritable_root_is_storage_unavailable() {
    let (dir, _) = setup();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "a file, not a directory").unwrap();
    let backend = FsBackend::new(blocker.join("data"));

    let err = backend
        .save_namespace("layout", &Default::default())
        .unwrap_err();
    assert!(err.is_storage_unavailable());
}
