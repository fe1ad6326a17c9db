use super::*;

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_set_get_remove() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("k").unwrap(), None);
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    storage.remove("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
}

#[test]
fn memory_clones_share_state() {
    let a = MemoryStorage::new();
    let b = a.clone();
    a.set("token", "abc").unwrap();
    assert_eq!(b.get("token").unwrap().as_deref(), Some("abc"));
}

#[test]
fn memory_remove_missing_key_is_ok() {
    let storage = MemoryStorage::new();
    assert!(storage.remove("nope").is_ok());
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("session.json"));
    assert_eq!(storage.get("session").unwrap(), None);
    assert!(storage.remove("session").is_ok());
    assert!(!storage.path().exists());
}

#[test]
fn file_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    FileStorage::new(&path).set("session", "{\"x\":1}").unwrap();
    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get("session").unwrap().as_deref(), Some("{\"x\":1}"));
}

#[test]
fn file_remove_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("s.json"));
    storage.set("a", "1").unwrap();
    storage.set("b", "2").unwrap();
    storage.remove("a").unwrap();
    assert_eq!(storage.get("a").unwrap(), None);
    assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_corrupt_read_errors_but_write_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    std::fs::write(&path, "not json at all").unwrap();

    let storage = FileStorage::new(&path);
    assert!(matches!(storage.get("a"), Err(StorageError::Corrupt { .. })));

    storage.set("a", "1").unwrap();
    assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn file_leaves_no_temp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.json");
    FileStorage::new(&path).set("a", "1").unwrap();
    assert!(!path.with_extension("tmp").exists());
}
