//! Integration tests for JsonItemRepository
//!
//! Each test works against a fresh temporary directory.

use domain::{DomainError, ImageRef, Item, ItemId, ItemRepository, ItemUpdate};
use infrastructure::JsonItemRepository;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn create_test_item(id: i64, title: &str) -> Item {
    Item {
        id: ItemId::new(id),
        title: title.to_string(),
        description: String::new(),
        tags: vec!["nature".to_string()],
        image_ref: ImageRef::new(format!("{id}-abc-{title}.jpg")),
    }
}

/// Reads the document through a fresh repository instance
async fn reload(path: &Path) -> Vec<Item> {
    JsonItemRepository::new(path).list_all().await.unwrap()
}

fn create_test_repo() -> (TempDir, JsonItemRepository) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let repo = JsonItemRepository::new(dir.path().join("data.json"));
    (dir, repo)
}

#[tokio::test]
async fn test_missing_document_is_empty() {
    let (_dir, repo) = create_test_repo();

    let items = repo.list_all().await.unwrap();
    assert!(items.is_empty());
    assert!(!repo.path().exists(), "Reading must not create the document");
}

#[tokio::test]
async fn test_append_persists_in_order() {
    let (_dir, repo) = create_test_repo();

    repo.append(create_test_item(1, "first")).await.unwrap();
    repo.append(create_test_item(2, "second")).await.unwrap();

    // A fresh repository over the same file sees the same state
    let reloaded = JsonItemRepository::new(repo.path());
    let titles: Vec<String> = reloaded
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[tokio::test]
async fn test_document_is_pretty_printed_with_items_field() {
    let (_dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "first")).await.unwrap();

    let raw = std::fs::read_to_string(repo.path()).unwrap();
    assert!(raw.contains('\n'), "Document should be pretty-printed");

    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["items"][0]["id"], 1);
    assert_eq!(json["items"][0]["imageRef"], "1-abc-first.jpg");
}

#[tokio::test]
async fn test_append_rejects_duplicate_id() {
    let (_dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "first")).await.unwrap();

    let err = repo.append(create_test_item(1, "again")).await.unwrap_err();
    assert_eq!(err, DomainError::DuplicateId(ItemId::new(1)));
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replace_merges_present_fields() {
    let (_dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "Sunset")).await.unwrap();

    let update = ItemUpdate::from_form(None, Some("Evening view".to_string()), None);
    let updated = repo.replace(ItemId::new(1), update).await.unwrap();

    assert_eq!(updated.title, "Sunset");
    assert_eq!(updated.description, "Evening view");
    assert_eq!(updated.tags, vec!["nature"]);
    assert_eq!(updated.image_ref.as_str(), "1-abc-Sunset.jpg");

    let stored = repo.find(ItemId::new(1)).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_replace_unknown_id_is_not_found() {
    let (_dir, repo) = create_test_repo();

    // No document at all
    let err = repo
        .replace(ItemId::new(9), ItemUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::ItemNotFound(ItemId::new(9)));

    // Document exists but the id does not
    repo.append(create_test_item(1, "first")).await.unwrap();
    let err = repo
        .replace(ItemId::new(9), ItemUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::ItemNotFound(ItemId::new(9)));
}

#[tokio::test]
async fn test_remove_returns_removed_item() {
    let (_dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "first")).await.unwrap();
    repo.append(create_test_item(2, "second")).await.unwrap();

    let removed = repo.remove(ItemId::new(1)).await.unwrap();
    assert_eq!(removed.title, "first");

    let remaining = repo.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ItemId::new(2));
}

#[tokio::test]
async fn test_remove_unknown_id_leaves_document_unchanged() {
    let (_dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "first")).await.unwrap();
    let before = std::fs::read(repo.path()).unwrap();

    let err = repo.remove(ItemId::new(42)).await.unwrap_err();
    assert_eq!(err, DomainError::ItemNotFound(ItemId::new(42)));

    let after = std::fs::read(repo.path()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_remove_without_document_is_not_found() {
    let (_dir, repo) = create_test_repo();
    let err = repo.remove(ItemId::new(1)).await.unwrap_err();
    assert!(matches!(err, DomainError::ItemNotFound(_)));
}

#[tokio::test]
async fn test_malformed_document_is_storage_error() {
    let (_dir, repo) = create_test_repo();
    std::fs::write(repo.path(), "{ not json").unwrap();

    let err = repo.list_all().await.unwrap_err();
    assert!(matches!(err, DomainError::Storage(_)));
}

#[tokio::test]
async fn test_document_without_items_field_is_empty() {
    let (_dir, repo) = create_test_repo();
    std::fs::write(repo.path(), "{}").unwrap();

    assert!(repo.list_all().await.unwrap().is_empty());
    repo.append(create_test_item(1, "first")).await.unwrap();
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_temp_file_left_behind() {
    let (dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "first")).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["data.json"]);
}

#[tokio::test]
async fn test_failed_temp_write_keeps_document() {
    let (dir, repo) = create_test_repo();
    repo.append(create_test_item(1, "kept")).await.unwrap();
    let before = std::fs::read(repo.path()).unwrap();

    // A directory squatting on the temp path makes the write fail
    let blocker = dir.path().join("data.json.tmp");
    std::fs::create_dir(&blocker).unwrap();

    let result = repo.append(create_test_item(2, "lost")).await;
    assert!(matches!(result, Err(DomainError::Storage(_))));
    assert_eq!(std::fs::read(repo.path()).unwrap(), before);
    assert!(blocker.is_dir(), "Cleanup must not touch a non-file temp path");

    let titles: Vec<String> = reload(repo.path())
        .await
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(titles, vec!["kept"]);
}

#[tokio::test]
async fn test_concurrent_appends_are_not_lost() {
    let (_dir, repo) = create_test_repo();
    let repo = Arc::new(repo);

    let handles: Vec<_> = (1..=20)
        .map(|id| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.append(create_test_item(id, "item")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.list_all().await.unwrap().len(), 20);
    assert_eq!(repo.max_id().await.unwrap(), Some(ItemId::new(20)));
}

#[tokio::test]
async fn test_reload_matches_state_after_each_operation() {
    let (_dir, repo) = create_test_repo();
    let mut expected: Vec<Item> = Vec::new();

    let a = repo.append(create_test_item(1, "a")).await.unwrap();
    expected.push(a);
    assert_eq!(reload(repo.path()).await, expected);

    let b = repo.append(create_test_item(2, "b")).await.unwrap();
    expected.push(b);
    assert_eq!(reload(repo.path()).await, expected);

    let update = ItemUpdate::from_form(Some("a2".into()), None, Some("x, y".into()));
    expected[0] = repo.replace(ItemId::new(1), update).await.unwrap();
    assert_eq!(reload(repo.path()).await, expected);

    repo.remove(ItemId::new(2)).await.unwrap();
    expected.pop();
    assert_eq!(reload(repo.path()).await, expected);
    assert_eq!(expected[0].tags, vec!["x", "y"]);
}
