//! Shopping cart module.
//!
//! Contains the cart and its line items, and the persistent per-device
//! cart store.

mod cart;
mod store;

pub use cart::{Cart, CartItem, CartKey, DEFAULT_MAX_QUANTITY_PER_ITEM};
pub use store::{CartStore, CART_STORAGE_KEY};
