use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn file_blob_store_round_trips_a_put() {
    let dir = tempdir().unwrap();
    let store = FileBlobStore::new(dir.path());
    store.put("docs/a.txt", b"hello".to_vec()).await.unwrap();
    assert_eq!(store.get("docs/a.txt").await.unwrap(), b"hello");
}

#[tokio::test]
async fn file_blob_store_get_missing_is_not_found() {
    let dir = tempdir().unwrap();
    let store = FileBlobStore::new(dir.path());
    assert!(matches!(store.get("missing").await, Err(BlobError::NotFound(_))));
}

#[tokio::test]
async fn file_blob_store_delete_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = FileBlobStore::new(dir.path());
    store.put("a", b"x".to_vec()).await.unwrap();
    store.delete("a").await.unwrap();
    store.delete("a").await.unwrap();
    assert!(store.get("a").await.is_err());
}

#[tokio::test]
async fn fake_blob_store_round_trips() {
    let store = fake::FakeBlobStore::new();
    store.put("k", vec![1, 2, 3]).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), vec![1, 2, 3]);
}
