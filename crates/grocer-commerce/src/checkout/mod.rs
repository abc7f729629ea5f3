//! Checkout module.
//!
//! Contains order and delivery types, the order lifecycle service and the
//! checkout flow that ties the cart to it.

mod delivery;
mod flow;
mod lifecycle;
mod order;

pub use delivery::{Delivery, DeliveryDestination, DeliverySchedule};
pub use flow::CheckoutService;
pub use lifecycle::{OrderService, ORDERS};
pub use order::{Order, OrderItem, OrderStatus};
pub(crate) use order::OrderDraft;
