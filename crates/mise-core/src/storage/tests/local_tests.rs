use std::sync::Arc;

use tempfile::tempdir;

use crate::storage::error::{StorageResult, StorageSystemError};
use crate::storage::local::FileKeyValueStore;
use crate::storage::memory::MemoryKeyValueStore;
use crate::storage::provider::KeyValueStore;

#[test]
fn test_set_and_get() -> StorageResult<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());

    store.set("offline_data", "[1,2,3]")?;

    assert_eq!(store.get("offline_data")?.as_deref(), Some("[1,2,3]"));
    assert!(temp_dir.path().join("offline_data.json").exists());
    Ok(())
}

#[test]
fn test_missing_key_reads_as_none() -> StorageResult<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileKeyValueStore::new(temp_dir.path().join("not-yet-created"));

    assert_eq!(store.get("cached_data")?, None);
    Ok(())
}

#[test]
fn test_overwrite_leaves_no_temp_files() -> StorageResult<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileKeyValueStore::open(temp_dir.path().to_path_buf())?;

    store.set("plugin_registry", "first")?;
    store.set("plugin_registry", "second")?;

    assert_eq!(store.get("plugin_registry")?.as_deref(), Some("second"));
    let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1, "only the persisted key file should remain");
    Ok(())
}

#[test]
fn test_values_survive_reopen() -> StorageResult<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    {
        let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());
        store.set("cached_data", "{\"a\":1}")?;
    }
    let reopened = FileKeyValueStore::new(temp_dir.path().to_path_buf());
    assert_eq!(reopened.get("cached_data")?.as_deref(), Some("{\"a\":1}"));
    Ok(())
}

#[test]
fn test_delete_is_idempotent() -> StorageResult<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());

    store.set("k", "v")?;
    store.delete("k")?;
    store.delete("k")?;

    assert_eq!(store.get("k")?, None);
    Ok(())
}

#[test]
fn test_rejects_path_like_keys() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());

    for key in ["", "../escape", "nested/key", ".hidden", "spaced key"] {
        let err = store.set(key, "x").expect_err("key should be rejected");
        assert!(
            matches!(err, StorageSystemError::InvalidKey { .. }),
            "unexpected error for {:?}: {:?}",
            key,
            err
        );
    }
}

#[test]
fn test_memory_store_round_trip() -> StorageResult<()> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());

    assert_eq!(store.name(), "memory");
    store.set("k", "v")?;
    assert_eq!(store.get("k")?.as_deref(), Some("v"));
    store.delete("k")?;
    assert_eq!(store.get("k")?, None);
    Ok(())
}
