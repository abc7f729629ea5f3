//! Order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::checkout::Delivery;
use crate::error::CommerceError;
use crate::ids::{IdempotencyKey, OrderId, ProductId, UserId};
use crate::money::Money;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Placed and waiting to be delivered.
    #[default]
    #[serde(rename = "in progress")]
    InProgress,
    /// Delivered and closed by an administrator.
    #[serde(rename = "completed")]
    Completed,
    /// Cancelled. No operation moves an order here yet.
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "in progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "In progress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether an order in this status may move to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::InProgress, OrderStatus::Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "in progress" | "pending" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CommerceError::Validation(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

/// One line of an order, frozen at placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub variation_name: String,
    pub quantity: i64,
    /// Unit price.
    pub price: Money,
}

impl OrderItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            variation_name: item.variation_name.clone(),
            quantity: item.quantity,
            price: item.unit_price,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Customer who placed the order.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Sum of item prices times quantities when the order was placed.
    pub total_price: Money,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub delivery: Delivery,
    pub idempotency_key: IdempotencyKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Recompute the total from the items.
    pub fn items_total(&self) -> Result<Money, CommerceError> {
        let lines = self
            .items
            .iter()
            .map(OrderItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(lines.iter(), self.total_price.currency).ok_or(CommerceError::Overflow)
    }
}

/// Order body as written at placement. The store assigns id and timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderDraft {
    pub user_id: UserId,
    pub total_price: Money,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub delivery: Delivery,
    pub idempotency_key: IdempotencyKey,
}

impl OrderDraft {
    /// Snapshot a cart into a new in-progress order.
    pub fn from_cart(
        user_id: UserId,
        cart: &Cart,
        delivery: Delivery,
        idempotency_key: IdempotencyKey,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        Ok(Self {
            user_id,
            total_price: cart.total()?,
            status: OrderStatus::InProgress,
            items: cart.items().iter().map(OrderItem::from).collect(),
            delivery,
            idempotency_key,
        })
    }
}
