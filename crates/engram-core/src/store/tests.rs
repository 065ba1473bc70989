//! Tests for the in-memory store

use std::time::Duration;

use super::*;

#[tokio::test]
async fn test_memory_store_set_get() {
    let store = MemoryStore::new();

    store.set("k1", "hello").await.unwrap();

    assert_eq!(store.get("k1").await.unwrap(), Some("hello".to_string()));
    assert_eq!(store.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_store_overwrite() {
    let store = MemoryStore::new();

    store.set("k1", "first").await.unwrap();
    store.set("k1", "second").await.unwrap();

    assert_eq!(store.get("k1").await.unwrap(), Some("second".to_string()));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_memory_store_setex_expires() {
    let store = MemoryStore::new();

    store.setex("k1", 1, "short-lived").await.unwrap();
    assert!(store.get("k1").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(store.get("k1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_delete_counts() {
    let store = MemoryStore::new();

    store.set("k1", "v").await.unwrap();

    assert_eq!(store.delete("k1").await.unwrap(), 1);
    assert_eq!(store.delete("k1").await.unwrap(), 0);
    assert!(store.is_empty().await);
}
