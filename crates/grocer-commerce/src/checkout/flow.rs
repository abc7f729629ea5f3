//! Checkout: turn the session's cart into an order.

use std::sync::Arc;

use grocer_store::{DocumentStore, KeyValueStore};

use crate::cart::CartStore;
use crate::checkout::{DeliverySchedule, Order, OrderService};
use crate::customer::ProfileService;
use crate::error::CommerceError;
use crate::ids::{IdempotencyKey, UserId};

/// Runs checkout for a signed-in customer.
///
/// Checks run in this order: the cart must not be empty, then the customer
/// must have a profile. The cart is cleared only after the order is written.
pub struct CheckoutService<D: DocumentStore> {
    profiles: ProfileService<D>,
    orders: OrderService<D>,
}

impl<D: DocumentStore> Clone for CheckoutService<D> {
    fn clone(&self) -> Self {
        Self {
            profiles: self.profiles.clone(),
            orders: self.orders.clone(),
        }
    }
}

impl<D: DocumentStore> CheckoutService<D> {
    /// Create a checkout service on a shared store.
    pub fn new(store: Arc<D>) -> Self {
        Self {
            profiles: ProfileService::new(Arc::clone(&store)),
            orders: OrderService::new(store),
        }
    }

    /// Place an order for everything in `cart`, then empty it.
    pub async fn checkout<K: KeyValueStore>(
        &self,
        user_id: &UserId,
        cart: &mut CartStore<K>,
        schedule: DeliverySchedule,
        idempotency_key: &IdempotencyKey,
    ) -> Result<Order, CommerceError> {
        if cart.cart().is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let profile = self.profiles.require_profile(user_id).await?;

        let order = match self
            .orders
            .place_order(user_id, cart.cart(), &profile, schedule, idempotency_key)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "checkout failed, cart kept");
                return Err(e);
            }
        };

        cart.clear();
        Ok(order)
    }
}
