use super::*;
use crate::signature::Signature;

fn sample_entry(name: &str) -> FileEntry {
    let sigs = vec![Signature::of(b"abc"), Signature::of(b"def")];
    FileEntry::new(name.to_string(), 6, sigs)
}

#[test]
fn round_trips_through_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.db");

    let mut registry = Registry::new();
    registry.replace_or_add(sample_entry("a.bin"));
    registry.replace_or_add(sample_entry("b.bin"));

    persist::save(&path, &registry).unwrap();
    let loaded = persist::load(&path).unwrap();

    assert_eq!(loaded, registry);
}

#[test]
fn load_of_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    let registry = persist::load(&path).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn load_of_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.db");
    std::fs::write(&path, b"not an index").unwrap();
    assert!(persist::load(&path).is_err());
}

#[test]
fn replace_or_add_overwrites_same_filename() {
    let mut registry = Registry::new();
    registry.replace_or_add(sample_entry("a.bin"));
    let replacement = FileEntry::new("a.bin".to_string(), 99, vec![Signature::of(b"zzz")]);
    registry.replace_or_add(replacement.clone());
    assert_eq!(registry.find("a.bin"), Some(&replacement));
    assert_eq!(registry.len(), 1);
}

#[test]
fn store_commit_persists_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.db");

    let store = Store::open(&path).unwrap();
    assert!(store.is_empty());
    store.commit(sample_entry("a.bin")).unwrap();

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.find("a.bin"), Some(sample_entry("a.bin")));
}

#[test]
fn store_find_returns_none_for_unknown_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("index.db")).unwrap();
    assert_eq!(store.find("nope.bin"), None);
}
