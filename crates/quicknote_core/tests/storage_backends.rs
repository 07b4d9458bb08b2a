use chrono::{TimeZone, Utc};
use quicknote_core::{
    FileStorage, KeyValueStorage, ManualClock, NoteStoreConfig, NoteStoreManager,
    SequentialIdGenerator, SqliteStorage, StorageError,
};

fn open_with<S: KeyValueStorage>(
    storage: S,
    config: NoteStoreConfig,
) -> NoteStoreManager<S, ManualClock, SequentialIdGenerator> {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap());
    NoteStoreManager::hydrate_with(storage, config, clock, SequentialIdGenerator::new("note"))
}

#[test]
fn sqlite_storage_carries_notes_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quicknote.sqlite3");

    {
        let storage = SqliteStorage::open(&path).unwrap();
        let mut manager = open_with(storage, NoteStoreConfig::default());
        manager.create_note().unwrap();
        manager.update_active_note_content("stored in sqlite");
        manager.close().unwrap();
    }

    let storage = SqliteStorage::open(&path).unwrap();
    let manager = open_with(storage, NoteStoreConfig::default());
    assert_eq!(manager.store().len(), 1);
    assert_eq!(manager.active_note().unwrap().content, "stored in sqlite");
    assert_eq!(
        manager.storage().keys().unwrap(),
        vec![NoteStoreConfig::default().storage_key]
    );
}

#[test]
fn file_storage_uses_configured_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = NoteStoreConfig {
        storage_key: "custom-notes.json".to_string(),
        ..NoteStoreConfig::default()
    };

    {
        let mut manager = open_with(FileStorage::open(dir.path()).unwrap(), config.clone());
        manager.create_note().unwrap();
        manager.flush().unwrap();
    }

    assert!(dir.path().join("custom-notes.json").is_file());
    let manager = open_with(FileStorage::open(dir.path()).unwrap(), config);
    assert_eq!(manager.store().len(), 1);
}

#[test]
fn file_storage_read_error_falls_back_to_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("quicknote.store")).unwrap();

    let storage = FileStorage::open(dir.path()).unwrap();
    let mut manager = open_with(storage, NoteStoreConfig::default());
    assert!(manager.hydration().is_fallback());
    assert!(manager.store().is_empty());
    assert!(manager.create_note().is_some());
}

#[test]
fn sqlite_value_limit_surfaces_as_failed_status() {
    let storage = SqliteStorage::open_in_memory().unwrap().with_value_limit(16);
    let mut manager = open_with(storage, NoteStoreConfig::default());
    manager.create_note().unwrap();

    let err = manager.flush().unwrap_err();
    assert!(matches!(err, StorageError::CapacityExceeded { .. }));
    assert!(!manager.persistence_status().is_durable());
}
