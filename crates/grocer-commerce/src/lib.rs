//! Storefront domain types and logic for the campus grocer.
//!
//! - **Catalog**: products, variations and variation pricing
//! - **Cart**: the session cart and its per-device persistence
//! - **Customer**: student and non-student profiles
//! - **Checkout**: orders, delivery details and the order lifecycle
//!
//! Persistence goes through the [`grocer_store`] interfaces, so every service
//! is generic over the document store it runs on.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grocer_commerce::prelude::*;
//! use grocer_store::{DirKv, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let catalog = CatalogService::new(Arc::clone(&store));
//! let product = catalog.get_product(&ProductId::new("cooking-oil")).await?;
//!
//! let mut cart = CartStore::open(DirKv::open(".grocer/local")?, Currency::ZMW, 99);
//! cart.add_item(&product, product.require_variation("2L")?, 2)?;
//! println!("Total: {}", cart.total()?.display());
//!
//! let order = CheckoutService::new(store)
//!     .checkout(&user_id, &mut cart, DeliverySchedule::Now, &IdempotencyKey::generate())
//!     .await?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod customer;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{line_price, unit_price, CatalogService, NewProduct, Product, Variation};

    // Cart
    pub use crate::cart::{Cart, CartItem, CartKey, CartStore};

    // Customer
    pub use crate::customer::{GeoPoint, NewProfile, ProfileService, Residence, UserProfile};

    // Checkout
    pub use crate::checkout::{
        CheckoutService, Delivery, DeliveryDestination, DeliverySchedule, Order, OrderItem,
        OrderService, OrderStatus,
    };
}
