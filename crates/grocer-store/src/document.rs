//! Document model and the document database interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{StoreError, StoreResult};

/// Length of server-assigned document ids.
const DOCUMENT_ID_LEN: usize = 20;

/// A stored document.
///
/// `id` and `created_at` are assigned by the store; `data` is the body the
/// caller wrote, always a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Document body.
    pub data: Map<String, Value>,
}

impl Document {
    /// Get a top-level field of the body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Deserialize the document into a domain type.
    ///
    /// The id and creation time are merged into the body as `id` and
    /// `createdAt` before deserializing, so domain types can carry them as
    /// ordinary fields.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let mut body = self.data.clone();
        body.insert("id".to_string(), Value::String(self.id.clone()));
        body.insert("createdAt".to_string(), serde_json::to_value(self.created_at)?);
        Ok(serde_json::from_value(Value::Object(body))?)
    }
}

/// Outcome of [`DocumentStore::create_unique`].
#[derive(Debug, Clone, PartialEq)]
pub enum UniqueInsert {
    /// The token was new and the document was written.
    Created(Document),
    /// The token was already used; nothing was written.
    Existing(Document),
}

impl UniqueInsert {
    /// The document now associated with the token.
    pub fn document(&self) -> &Document {
        match self {
            UniqueInsert::Created(doc) | UniqueInsert::Existing(doc) => doc,
        }
    }

    /// Whether this call wrote the document.
    pub fn was_created(&self) -> bool {
        matches!(self, UniqueInsert::Created(_))
    }
}

/// Document database interface.
///
/// Collections are created on first write. Listing operations return
/// documents newest first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a new document with a server-assigned id and timestamp.
    async fn create(&self, collection: &str, data: Value) -> StoreResult<Document>;

    /// Write a new document unless `token` was already used in this
    /// collection, in which case the earlier document is returned.
    async fn create_unique(
        &self,
        collection: &str,
        token: &str,
        data: Value,
    ) -> StoreResult<UniqueInsert>;

    /// Write a document under a caller-chosen id, replacing any existing body.
    ///
    /// The creation timestamp is kept when replacing.
    async fn put(&self, collection: &str, id: &str, data: Value) -> StoreResult<Document>;

    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge `patch` into a document if `field` currently equals `expected`.
    ///
    /// The check and the write happen as one step. Fails with
    /// [`StoreError::NotFound`] or [`StoreError::PreconditionFailed`].
    async fn update_if(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Value,
    ) -> StoreResult<Document>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// All documents of a collection, newest first.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Documents whose top-level `field` equals `value`, newest first.
    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>>;
}

/// Generate a random document id.
pub fn generate_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Require a JSON object body.
pub(crate) fn into_object(collection: &str, data: Value) -> StoreResult<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject(collection.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Named {
        id: String,
        name: String,
        created_at: DateTime<Utc>,
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_document_id();
        let b = generate_document_id();
        assert_eq!(a.len(), DOCUMENT_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_merges_id_and_timestamp() {
        let created_at = Utc::now();
        let doc = Document {
            id: "abc".to_string(),
            created_at,
            data: into_object("things", json!({ "name": "Rice" })).unwrap(),
        };

        let named: Named = doc.decode().unwrap();
        assert_eq!(named.id, "abc");
        assert_eq!(named.name, "Rice");
        assert_eq!(named.created_at, created_at);
    }

    #[test]
    fn test_into_object_rejects_scalars() {
        assert!(into_object("things", json!(42)).is_err());
    }
}
