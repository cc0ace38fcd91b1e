//! Tests for [`Store`] implementations: [`MemoryStore`] and [`FileStore`].

use countrieslib::cache::StoredSnapshot;
use countrieslib::{CountriesError, Country, FileStore, MemoryStore, Store};

#[tokio::test]
async fn memory_store_miss_returns_none() {
    let store = MemoryStore::new();
    assert!(store.get("nonexistent").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_store_set_then_get() {
    let store = MemoryStore::new();
    store.set("key", "value".to_string()).await.unwrap();
    assert_eq!(store.get("key").await.unwrap().as_deref(), Some("value"));
}

#[tokio::test]
async fn memory_store_overwrite_replaces_value() {
    let store = MemoryStore::default();
    store.set("key", "first".to_string()).await.unwrap();
    store.set("key", "second".to_string()).await.unwrap();
    assert_eq!(store.get("key").await.unwrap().as_deref(), Some("second"));
}

#[tokio::test]
async fn memory_store_clones_share_entries() {
    let store = MemoryStore::new();
    let clone = store.clone();
    store.set("shared", "yes".to_string()).await.unwrap();
    assert_eq!(clone.get("shared").await.unwrap().as_deref(), Some("yes"));
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let snapshot = StoredSnapshot {
        fetched_at: 42,
        data: vec![Country::new("GB"), Country::new("FO")],
    };
    store
        .set("countrieslib-countries", serde_json::to_string(&snapshot).unwrap())
        .await
        .unwrap();

    // On-disk format is the snapshot JSON.
    let raw: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("countrieslib-countries.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(raw["fetchedAt"], 42);
    assert_eq!(raw["data"].as_array().unwrap().len(), 2);

    let loaded = store.get("countrieslib-countries").await.unwrap().unwrap();
    let loaded: StoredSnapshot<Country> = serde_json::from_str(&loaded).unwrap();
    assert_eq!(loaded, snapshot);
}

#[tokio::test]
async fn file_store_missing_key_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn file_store_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("deep").join("nested");
    let store = FileStore::new(&nested);

    store.set("key", "{}".to_string()).await.unwrap();
    assert!(nested.join("key.json").exists());
    assert!(!nested.join("key.json.tmp").exists());
}

#[tokio::test]
async fn file_store_failed_rename_removes_tmp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    // A directory in the target's place makes the rename fail.
    std::fs::create_dir(dir.path().join("key.json")).unwrap();

    let err = store.set("key", "{}".to_string()).await.unwrap_err();
    assert!(matches!(err, CountriesError::Store(_)));
    assert!(!dir.path().join("key.json.tmp").exists());
}
