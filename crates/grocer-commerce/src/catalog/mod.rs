//! Catalog module.
//!
//! Contains products, their priced variations, and the admin-side catalog
//! service.

mod pricing;
mod product;
mod service;

pub use pricing::{line_price, unit_price};
pub use product::{NewProduct, Product, Variation};
pub use service::{CatalogService, PRODUCTS};
