//! Catalog service over the `products` collection.

use std::sync::Arc;

use grocer_store::DocumentStore;

use crate::catalog::{NewProduct, Product};
use crate::error::CommerceError;
use crate::ids::ProductId;

/// Collection holding products.
pub const PRODUCTS: &str = "products";

/// Reads and writes catalog products.
pub struct CatalogService<D: DocumentStore> {
    store: Arc<D>,
}

impl<D: DocumentStore> Clone for CatalogService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<D: DocumentStore> CatalogService<D> {
    /// Create a catalog service on a shared store.
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Validate and store a new product, returning its assigned id.
    pub async fn add_product(&self, product: NewProduct) -> Result<ProductId, CommerceError> {
        product.validate()?;
        let doc = self
            .store
            .create(PRODUCTS, serde_json::to_value(&product)?)
            .await?;
        tracing::info!(product_id = %doc.id, name = %product.name, "added product");
        Ok(ProductId::new(doc.id))
    }

    /// Fetch a product by id.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let doc = self
            .store
            .get(PRODUCTS, id.as_str())
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;
        Ok(doc.decode()?)
    }

    /// All products, newest first.
    pub async fn list_products(&self) -> Result<Vec<Product>, CommerceError> {
        let docs = self.store.list(PRODUCTS).await?;
        tracing::debug!(count = docs.len(), "listed products");
        docs.iter()
            .map(|doc| doc.decode().map_err(CommerceError::from))
            .collect()
    }

    /// Products whose name contains `query`, ignoring case, newest first.
    ///
    /// A blank query matches every product.
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, CommerceError> {
        let needle = query.trim().to_lowercase();
        let products = self.list_products().await?;
        if needle.is_empty() {
            return Ok(products);
        }
        let found: Vec<Product> = products
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        tracing::debug!(query = %needle, count = found.len(), "searched products");
        Ok(found)
    }
}
