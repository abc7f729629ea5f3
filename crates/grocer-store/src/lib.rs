//! Storage collaborators for the campus grocer.
//!
//! Two kinds of storage are used by the storefront:
//!
//! - **Documents**: the shared database holding the `products`, `users` and
//!   `orders` collections. [`DocumentStore`] is the async interface; the
//!   in-process [`MemoryStore`] implements it and can snapshot to a JSON file.
//! - **Local key/value**: per-device durable storage for the cart.
//!   [`KeyValueStore`] is the interface, with [`MemoryKv`] and [`DirKv`].
//!
//! # Example
//!
//! ```rust,ignore
//! use grocer_store::{DocumentStore, MemoryStore};
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! let doc = store.create("products", json!({ "name": "Mealie Meal" })).await?;
//! let found = store.get("products", &doc.id).await?;
//! ```

mod document;
mod error;
mod kv;
mod memory;

pub use document::{Document, DocumentStore, UniqueInsert, generate_document_id};
pub use error::{StoreError, StoreResult};
pub use kv::{DirKv, KeyValueStore, MemoryKv};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        DirKv, Document, DocumentStore, KeyValueStore, MemoryKv, MemoryStore, StoreError,
        StoreResult, UniqueInsert,
    };
}
