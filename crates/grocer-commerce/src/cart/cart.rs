//! Cart and line item types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Product, Variation};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Default maximum quantity allowed per line item.
pub const DEFAULT_MAX_QUANTITY_PER_ITEM: i64 = 99;

/// Identity of a cart line: one product in one variation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartKey {
    pub product_id: ProductId,
    pub variation_name: String,
}

impl CartKey {
    /// Create a new key.
    pub fn new(product_id: impl Into<ProductId>, variation_name: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variation_name: variation_name.into(),
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.product_id, self.variation_name)
    }
}

/// A line item in the cart.
///
/// The unit price is captured when the line is first added; later additions
/// of the same key only change the quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Selected variation.
    pub variation_name: String,
    /// Effective unit price (base price plus variation modifier).
    pub unit_price: Money,
    /// Quantity, at least 1.
    pub quantity: i64,
    /// Product name (denormalized for display).
    pub name: String,
    /// Product image URL (denormalized for display).
    #[serde(default)]
    pub image: String,
    /// Image alt text (denormalized for display).
    #[serde(default)]
    pub image_alt: String,
    /// Category tag (denormalized for display).
    #[serde(default)]
    pub category: String,
}

impl CartItem {
    /// The line's identity.
    pub fn key(&self) -> CartKey {
        CartKey::new(self.product_id.clone(), self.variation_name.clone())
    }

    fn matches(&self, key: &CartKey) -> bool {
        self.product_id == key.product_id && self.variation_name == key.variation_name
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// A shopping cart.
///
/// Lines are kept in insertion order and are unique by [`CartKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: Currency,
    max_quantity_per_item: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
            max_quantity_per_item: DEFAULT_MAX_QUANTITY_PER_ITEM,
        }
    }

    /// Set the per-line quantity cap. Lines already above it are lowered to it.
    pub fn with_max_quantity_per_item(mut self, max: i64) -> Self {
        self.max_quantity_per_item = max.max(1);
        self.clamp_to_cap();
        self
    }

    /// Rebuild a cart from stored items under the default cap.
    pub fn from_items(items: Vec<CartItem>, currency: Currency) -> Self {
        Self::new(currency).restore(items)
    }

    /// Merge stored lines into this cart.
    ///
    /// Lines with a quantity below 1 or a foreign currency are dropped,
    /// repeated keys are merged, and no line ends up above the cap.
    pub(crate) fn restore(mut self, items: Vec<CartItem>) -> Self {
        for item in items {
            if item.quantity < 1 || item.unit_price.currency != self.currency {
                continue;
            }
            match self.items.iter_mut().find(|i| i.matches(&item.key())) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => self.items.push(item),
            }
        }
        self.clamp_to_cap();
        self
    }

    fn clamp_to_cap(&mut self) {
        let max = self.max_quantity_per_item;
        for item in self.items.iter_mut().filter(|i| i.quantity > max) {
            tracing::warn!(key = %item.key(), quantity = item.quantity, max, "cart line above cap, lowered");
            item.quantity = max;
        }
    }

    /// Add `quantity` of a product variation.
    ///
    /// An existing line with the same key has its quantity increased;
    /// otherwise a new line is appended. Nothing changes on error:
    /// - quantity is not positive
    /// - the line would exceed the per-line cap
    /// - the variation's effective price is negative or overflows
    pub fn add_item(
        &mut self,
        product: &Product,
        variation: &Variation,
        quantity: i64,
    ) -> Result<CartKey, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let key = CartKey::new(product.id.clone(), variation.name.clone());

        if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&key)) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > self.max_quantity_per_item {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    self.max_quantity_per_item,
                ));
            }

            existing.quantity = new_quantity;
            return Ok(key);
        }

        if quantity > self.max_quantity_per_item {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                self.max_quantity_per_item,
            ));
        }

        let unit_price = product.price_of(variation)?;
        if unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        self.items.push(CartItem {
            product_id: product.id.clone(),
            variation_name: variation.name.clone(),
            unit_price,
            quantity,
            name: product.name.clone(),
            image: product.image.clone(),
            image_alt: product.image_alt.clone(),
            category: product.category.clone(),
        });
        Ok(key)
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove_item(&mut self, key: &CartKey) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        self.items.len() < len_before
    }

    /// Overwrite a line's quantity.
    ///
    /// A quantity below 1 removes the line. Returns whether a line was
    /// changed or removed.
    pub fn set_quantity(&mut self, key: &CartKey, quantity: i64) -> Result<bool, CommerceError> {
        if quantity < 1 {
            return Ok(self.remove_item(key));
        }

        if quantity > self.max_quantity_per_item {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                self.max_quantity_per_item,
            ));
        }

        match self.items.iter_mut().find(|i| i.matches(key)) {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of unit price times quantity over all lines, computed fresh.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.items
            .iter()
            .try_fold(Money::zero(self.currency), |acc, item| {
                acc.try_add(&item.line_total()?).ok_or(CommerceError::Overflow)
            })
    }

    /// Total number of units (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by key.
    pub fn get(&self, key: &CartKey) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(key))
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Per-line quantity cap.
    pub fn max_quantity_per_item(&self) -> i64 {
        self.max_quantity_per_item
    }

    /// Serialize the lines to their stored JSON form.
    pub fn to_json(&self) -> Result<String, CommerceError> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Restore a cart from [`to_json`](Cart::to_json) output.
    pub fn from_json(json: &str, currency: Currency) -> Result<Self, CommerceError> {
        let items: Vec<CartItem> = serde_json::from_str(json)?;
        Ok(Self::from_items(items, currency))
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}
