//! Commerce error types.

use grocer_store::StoreError;
use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variation not found on a product.
    #[error("Variation '{variation}' not found on product {product_id}")]
    VariationNotFound {
        product_id: String,
        variation: String,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The user has no stored profile.
    #[error("User profile not found for {0}. Please complete your profile.")]
    ProfileNotFound(String),

    /// Checkout attempted with nothing in the cart.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// A variation modifier takes the price below zero.
    #[error("Effective price {0} is negative")]
    NegativePrice(String),

    /// Order status change not allowed.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The caller may not see or act on this resource.
    #[error("Not authorized to access {0}")]
    NotAuthorized(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CommerceError {
    /// Whether the error was detected before any write happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommerceError::Validation(_)
                | CommerceError::EmptyCart
                | CommerceError::ProfileNotFound(_)
                | CommerceError::InvalidQuantity(_)
                | CommerceError::QuantityExceedsLimit(..)
                | CommerceError::NegativePrice(_)
                | CommerceError::VariationNotFound { .. }
        )
    }
}
