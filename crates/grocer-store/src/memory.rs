//! In-process document store with optional JSON snapshot persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::document::into_object;
use crate::{generate_document_id, Document, DocumentStore, StoreError, StoreResult, UniqueInsert};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    /// Monotonic write counter; breaks timestamp ties when ordering.
    sequence: u64,
    collections: BTreeMap<String, Collection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
    documents: BTreeMap<String, StoredDocument>,
    /// Uniqueness token -> document id.
    #[serde(default)]
    tokens: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    sequence: u64,
    created_at: DateTime<Utc>,
    data: Map<String, Value>,
}

impl StoredDocument {
    fn to_document(&self, id: &str) -> Document {
        Document {
            id: id.to_string(),
            created_at: self.created_at,
            data: self.data.clone(),
        }
    }
}

impl Snapshot {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn insert_new(&mut self, collection: &str, data: Map<String, Value>) -> Document {
        let sequence = self.next_sequence();
        let documents = &mut self.collections.entry(collection.to_string()).or_default().documents;

        let mut id = generate_document_id();
        while documents.contains_key(&id) {
            id = generate_document_id();
        }

        let stored = StoredDocument {
            sequence,
            created_at: Utc::now(),
            data,
        };
        let doc = stored.to_document(&id);
        documents.insert(id, stored);
        doc
    }

    fn sorted<'a>(
        documents: impl Iterator<Item = (&'a String, &'a StoredDocument)>,
    ) -> Vec<Document> {
        let mut found: Vec<(&String, &StoredDocument)> = documents.collect();
        found.sort_by(|(_, a), (_, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        found
            .into_iter()
            .map(|(id, stored)| stored.to_document(id))
            .collect()
    }
}

/// Document store held in memory.
///
/// Writes are serialized behind a single lock, so every operation is atomic
/// with respect to the others. When opened with a snapshot path, the full
/// state is rewritten to that file after each write, and a write whose
/// snapshot cannot be saved leaves the in-memory state untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Snapshot>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty, purely in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a JSON snapshot file.
    ///
    /// A missing file starts an empty store; an unreadable one is an error.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::OpenError(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        tracing::debug!(path = %path.display(), "opened document store");

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        })
    }

    /// Path of the snapshot file, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    async fn flush(&self, state: &Snapshot) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Apply `change` to a copy of `state`, flush it, and only then swap it in.
    ///
    /// Without a snapshot file the change is applied in place, so `change`
    /// must fail before it mutates anything.
    async fn commit<T>(
        &self,
        state: &mut Snapshot,
        change: impl FnOnce(&mut Snapshot) -> StoreResult<T>,
    ) -> StoreResult<T> {
        if self.snapshot_path.is_none() {
            return change(state);
        }
        let mut next = state.clone();
        let out = change(&mut next)?;
        self.flush(&next).await?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, data: Value) -> StoreResult<Document> {
        let data = into_object(collection, data)?;
        let mut state = self.state.write().await;
        let doc = self
            .commit(&mut state, |next| Ok(next.insert_new(collection, data)))
            .await?;
        tracing::debug!(collection, id = %doc.id, "created document");
        Ok(doc)
    }

    async fn create_unique(
        &self,
        collection: &str,
        token: &str,
        data: Value,
    ) -> StoreResult<UniqueInsert> {
        let data = into_object(collection, data)?;
        let mut state = self.state.write().await;

        if let Some(existing) = state.collections.get(collection).and_then(|c| {
            c.tokens
                .get(token)
                .and_then(|id| c.documents.get(id).map(|stored| stored.to_document(id)))
        }) {
            tracing::debug!(collection, id = %existing.id, "duplicate token, returning existing document");
            return Ok(UniqueInsert::Existing(existing));
        }

        let doc = self
            .commit(&mut state, |next| {
                let doc = next.insert_new(collection, data);
                next.collections
                    .entry(collection.to_string())
                    .or_default()
                    .tokens
                    .insert(token.to_string(), doc.id.clone());
                Ok(doc)
            })
            .await?;
        tracing::debug!(collection, id = %doc.id, "created document");
        Ok(UniqueInsert::Created(doc))
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document> {
        let data = into_object(collection, data)?;
        let mut state = self.state.write().await;
        self.commit(&mut state, |next| {
            let sequence = next.next_sequence();
            let documents = &mut next
                .collections
                .entry(collection.to_string())
                .or_default()
                .documents;

            let created_at = documents
                .get(id)
                .map(|existing| existing.created_at)
                .unwrap_or_else(Utc::now);
            let stored = StoredDocument {
                sequence,
                created_at,
                data,
            };
            let doc = stored.to_document(id);
            documents.insert(id.to_string(), stored);
            Ok(doc)
        })
        .await
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.documents.get(id))
            .map(|stored| stored.to_document(id)))
    }

    async fn update_if(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Value,
    ) -> StoreResult<Document> {
        let patch = into_object(collection, patch)?;
        let mut state = self.state.write().await;
        self.commit(&mut state, |next| {
            let stored = next
                .collections
                .get_mut(collection)
                .and_then(|c| c.documents.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;

            let actual = stored.data.get(field).cloned().unwrap_or(Value::Null);
            if &actual != expected {
                return Err(StoreError::PreconditionFailed {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    field: field.to_string(),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }

            stored.data.extend(patch);
            Ok(stored.to_document(id))
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let exists = state
            .collections
            .get(collection)
            .is_some_and(|c| c.documents.contains_key(id));
        if !exists {
            return Ok(false);
        }
        self.commit(&mut state, |next| {
            if let Some(c) = next.collections.get_mut(collection) {
                c.tokens.retain(|_, doc_id| doc_id != id);
                c.documents.remove(id);
            }
            Ok(true)
        })
        .await
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .map(|c| Snapshot::sorted(c.documents.iter()))
            .unwrap_or_default())
    }

    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .map(|c| {
                Snapshot::sorted(
                    c.documents
                        .iter()
                        .filter(|(_, stored)| stored.data.get(field) == Some(value)),
                )
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let doc = store
            .create("products", json!({ "name": "Cooking Oil" }))
            .await
            .unwrap();

        let found = store.get("products", &doc.id).await.unwrap().unwrap();
        assert_eq!(found, doc);
        assert_eq!(found.field("name"), Some(&json!("Cooking Oil")));
        assert!(store.get("products", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        let first = store.create("orders", json!({ "n": 1 })).await.unwrap();
        let second = store.create("orders", json!({ "n": 2 })).await.unwrap();
        let third = store.create("orders", json!({ "n": 3 })).await.unwrap();

        let ids: Vec<String> = store
            .list("orders")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_create_unique_collapses_duplicates() {
        let store = MemoryStore::new();
        let first = store
            .create_unique("orders", "token-1", json!({ "total": 10 }))
            .await
            .unwrap();
        let again = store
            .create_unique("orders", "token-1", json!({ "total": 99 }))
            .await
            .unwrap();

        assert!(first.was_created());
        assert!(!again.was_created());
        assert_eq!(first.document().id, again.document().id);
        assert_eq!(again.document().field("total"), Some(&json!(10)));
        assert_eq!(store.list("orders").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_if_checks_precondition() {
        let store = MemoryStore::new();
        let doc = store
            .create("orders", json!({ "status": "open" }))
            .await
            .unwrap();

        let updated = store
            .update_if("orders", &doc.id, "status", &json!("open"), json!({ "status": "done" }))
            .await
            .unwrap();
        assert_eq!(updated.field("status"), Some(&json!("done")));
        assert_eq!(updated.created_at, doc.created_at);

        let err = store
            .update_if("orders", &doc.id, "status", &json!("open"), json!({ "status": "done" }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed { .. }));

        let err = store
            .update_if("orders", "nope", "status", &json!("open"), json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_by_filters_on_field() {
        let store = MemoryStore::new();
        store.create("orders", json!({ "userId": "a" })).await.unwrap();
        store.create("orders", json!({ "userId": "b" })).await.unwrap();
        store.create("orders", json!({ "userId": "a" })).await.unwrap();

        let found = store.find_by("orders", "userId", &json!("a")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.field("userId") == Some(&json!("a"))));
    }

    #[tokio::test]
    async fn test_put_keeps_creation_time() {
        let store = MemoryStore::new();
        let first = store.put("users", "u1", json!({ "name": "A" })).await.unwrap();
        let second = store.put("users", "u1", json!({ "name": "B" })).await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.field("name"), Some(&json!("B")));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let doc = store.create("orders", json!({})).await.unwrap();
        assert!(store.delete("orders", &doc.id).await.unwrap());
        assert!(!store.delete("orders", &doc.id).await.unwrap());
        assert!(store.list("orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("database.json");

        let id = {
            let store = MemoryStore::open(&path).await.unwrap();
            store
                .create_unique("orders", "tok", json!({ "total": 5 }))
                .await
                .unwrap()
                .document()
                .id
                .clone()
        };

        let reopened = MemoryStore::open(&path).await.unwrap();
        assert!(reopened.get("orders", &id).await.unwrap().is_some());
        let again = reopened
            .create_unique("orders", "tok", json!({ "total": 6 }))
            .await
            .unwrap();
        assert!(!again.was_created());
    }

    #[tokio::test]
    async fn test_failed_flush_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let store = MemoryStore::open(&path).await.unwrap();
        let doc = store
            .create_unique("orders", "tok", json!({ "status": "open" }))
            .await
            .unwrap()
            .document()
            .clone();

        // A directory where the snapshot file should be makes every write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store
            .update_if("orders", &doc.id, "status", &json!("open"), json!({ "status": "done" }))
            .await
            .is_err());
        assert!(store.create("orders", json!({ "n": 2 })).await.is_err());
        assert!(store
            .create_unique("orders", "tok-2", json!({ "n": 3 }))
            .await
            .is_err());
        assert!(store.put("users", "u1", json!({ "name": "A" })).await.is_err());
        assert!(store.delete("orders", &doc.id).await.is_err());

        let current = store.get("orders", &doc.id).await.unwrap().unwrap();
        assert_eq!(current.field("status"), Some(&json!("open")));
        assert_eq!(store.list("orders").await.unwrap().len(), 1);
        assert!(store.get("users", "u1").await.unwrap().is_none());

        std::fs::remove_dir(&path).unwrap();
        let retried = store
            .create_unique("orders", "tok-2", json!({ "n": 3 }))
            .await
            .unwrap();
        assert!(retried.was_created());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = MemoryStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::OpenError(_)));
    }
}
