//! Cart persisted to per-device key/value storage.

use grocer_store::KeyValueStore;

use crate::cart::{Cart, CartItem, CartKey};
use crate::catalog::{Product, Variation};
use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// Storage key holding the serialized cart lines.
pub const CART_STORAGE_KEY: &str = "cart";

/// The session's cart, saved to local storage after every change.
///
/// Created at session start with [`CartStore::open`], which reads the stored
/// lines once. Missing or unreadable data gives an empty cart. Save failures
/// are logged and leave the in-memory cart as it is.
pub struct CartStore<K: KeyValueStore> {
    cart: Cart,
    storage: K,
}

impl<K: KeyValueStore> CartStore<K> {
    /// Load the cart from storage.
    pub fn open(storage: K, currency: Currency, max_quantity_per_item: i64) -> Self {
        let items = match storage.get_json::<Vec<CartItem>>(CART_STORAGE_KEY) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "stored cart unreadable, starting empty");
                Vec::new()
            }
        };

        let cart = Cart::new(currency)
            .with_max_quantity_per_item(max_quantity_per_item)
            .restore(items);
        tracing::debug!(lines = cart.len(), "loaded cart");
        Self { cart, storage }
    }

    /// The current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The underlying storage.
    pub fn storage(&self) -> &K {
        &self.storage
    }

    /// See [`Cart::add_item`].
    pub fn add_item(
        &mut self,
        product: &Product,
        variation: &Variation,
        quantity: i64,
    ) -> Result<CartKey, CommerceError> {
        let key = self.cart.add_item(product, variation, quantity)?;
        self.save();
        Ok(key)
    }

    /// See [`Cart::remove_item`].
    pub fn remove_item(&mut self, key: &CartKey) -> bool {
        let removed = self.cart.remove_item(key);
        if removed {
            self.save();
        }
        removed
    }

    /// See [`Cart::set_quantity`].
    pub fn set_quantity(&mut self, key: &CartKey, quantity: i64) -> Result<bool, CommerceError> {
        let changed = self.cart.set_quantity(key, quantity)?;
        if changed {
            self.save();
        }
        Ok(changed)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.save();
    }

    /// See [`Cart::total`].
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.cart.total()
    }

    fn save(&self) {
        if let Err(e) = self.storage.set_json(CART_STORAGE_KEY, self.cart.items()) {
            tracing::warn!(error = %e, "failed to save cart");
        }
    }
}
