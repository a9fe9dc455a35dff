use super::*;
use std::collections::HashSet;
use tempfile::TempDir;

#[test]
fn collection_ids_are_unique() {
    let ids: HashSet<String> = (0..100)
        .map(|_| CollectionRegistry::create_collection_id())
        .collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn scoped_path_is_deterministic_and_distinct_from_default() {
    let dir = TempDir::new().expect("should create TempDir successfully");
    let registry = CollectionRegistry::new(dir.path());

    let path_a = registry
        .collection_path("upload-42")
        .expect("should derive path successfully");
    let path_b = registry
        .collection_path("upload-42")
        .expect("should derive path successfully");

    assert_eq!(path_a, path_b);
    assert_ne!(path_a, registry.default_collection_path());
    assert_eq!(
        path_a.file_name().and_then(|n| n.to_str()),
        Some("vectorstore_upload-42.json")
    );
}

#[test]
fn invalid_scope_ids_are_rejected() {
    let dir = TempDir::new().expect("should create TempDir successfully");
    let registry = CollectionRegistry::new(dir.path());

    assert!(registry.collection_path("").is_err());
    assert!(registry.collection_path("../escape").is_err());
    assert!(registry.collection_path("has space").is_err());
    assert!(registry.collection_path("has/slash").is_err());
}

#[test]
fn generated_ids_are_valid_scope_ids() {
    let dir = TempDir::new().expect("should create TempDir successfully");
    let registry = CollectionRegistry::new(dir.path());

    let id = CollectionRegistry::create_collection_id();
    assert!(registry.collection_path(&id).is_ok());
}

#[test]
fn list_collections_reports_default_and_scoped() {
    let dir = TempDir::new().expect("should create TempDir successfully");
    let registry = CollectionRegistry::new(dir.path());

    assert!(registry
        .list_collections()
        .expect("should list collections successfully")
        .is_empty());

    // Opening alone does not persist; only a write does.
    let mut default = registry
        .open_default()
        .expect("should open default collection successfully");
    default.clear().expect("should persist successfully");

    let mut scoped = registry
        .open_scoped("upload-7")
        .expect("should open scoped collection successfully");
    scoped.clear().expect("should persist successfully");

    let names = registry
        .list_collections()
        .expect("should list collections successfully");
    assert_eq!(names, vec!["default".to_string(), "upload-7".to_string()]);
}

#[test]
fn create_scoped_allocates_fresh_collection() {
    let dir = TempDir::new().expect("should create TempDir successfully");
    let registry = CollectionRegistry::new(dir.path());

    let (scope_id, collection) = registry
        .create_scoped()
        .expect("should allocate collection successfully");

    assert!(collection.is_empty());
    assert_eq!(collection.name(), scope_id);

    let (other_id, _) = registry
        .create_scoped()
        .expect("should allocate collection successfully");
    assert_ne!(scope_id, other_id);
}

#[test]
fn remove_scoped_deletes_persisted_file() {
    let dir = TempDir::new().expect("should create TempDir successfully");
    let registry = CollectionRegistry::new(dir.path());

    let mut scoped = registry
        .open_scoped("doomed")
        .expect("should open scoped collection successfully");
    scoped.clear().expect("should persist successfully");

    assert!(registry
        .remove_scoped("doomed")
        .expect("should remove collection successfully"));
    assert!(!registry
        .remove_scoped("doomed")
        .expect("should report missing collection successfully"));
}
