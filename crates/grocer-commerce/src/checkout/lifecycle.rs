//! Order placement and status changes over the `orders` collection.

use std::sync::Arc;

use chrono::Utc;
use grocer_store::{DocumentStore, StoreError, UniqueInsert};
use serde_json::{json, Value};

use crate::cart::Cart;
use crate::checkout::{Delivery, DeliverySchedule, Order, OrderDraft, OrderStatus};
use crate::customer::UserProfile;
use crate::error::CommerceError;
use crate::ids::{IdempotencyKey, OrderId, UserId};

/// Collection holding orders in every status.
pub const ORDERS: &str = "orders";

/// Places orders and moves them through their status lifecycle.
///
/// Completion is a conditional update of the order's `status` field, so an
/// order is only ever stored once.
pub struct OrderService<D: DocumentStore> {
    store: Arc<D>,
}

impl<D: DocumentStore> Clone for OrderService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<D: DocumentStore> OrderService<D> {
    /// Create an order service on a shared store.
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Snapshot `cart` into a new in-progress order.
    ///
    /// Placing again with the same `idempotency_key` returns the order from
    /// the first call without writing another one. Keys are scoped to the
    /// customer, so another customer reusing a key gets an order of their
    /// own. The cart is not touched.
    pub async fn place_order(
        &self,
        user_id: &UserId,
        cart: &Cart,
        profile: &UserProfile,
        schedule: DeliverySchedule,
        idempotency_key: &IdempotencyKey,
    ) -> Result<Order, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        if profile.id != *user_id {
            return Err(CommerceError::NotAuthorized(format!("profile {}", profile.id)));
        }
        schedule.validate(Utc::now())?;

        let draft = OrderDraft::from_cart(
            user_id.clone(),
            cart,
            Delivery::from_profile(profile, schedule),
            idempotency_key.clone(),
        )?;
        let insert = self
            .store
            .create_unique(
                ORDERS,
                &placement_token(user_id, idempotency_key),
                serde_json::to_value(&draft)?,
            )
            .await?;

        let order: Order = insert.document().decode()?;
        if order.user_id != *user_id {
            tracing::warn!(
                order_id = %order.id,
                user_id = %user_id,
                "idempotency key resolved to another customer's order"
            );
            return Err(CommerceError::NotAuthorized(format!("order {}", order.id)));
        }
        match insert {
            UniqueInsert::Created(_) => tracing::info!(
                order_id = %order.id,
                user_id = %user_id,
                total = %order.total_price.display(),
                items = order.items.len(),
                "placed order"
            ),
            UniqueInsert::Existing(_) => tracing::info!(
                order_id = %order.id,
                idempotency_key = %idempotency_key,
                "duplicate placement, returning existing order"
            ),
        }
        Ok(order)
    }

    /// Fetch an order by id.
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, CommerceError> {
        let doc = self
            .store
            .get(ORDERS, id.as_str())
            .await?
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))?;
        Ok(doc.decode()?)
    }

    /// Fetch an order on behalf of a customer, who may only see their own.
    pub async fn get_order_for_user(
        &self,
        id: &OrderId,
        user_id: &UserId,
    ) -> Result<Order, CommerceError> {
        let order = self.get_order(id).await?;
        if order.user_id != *user_id {
            return Err(CommerceError::NotAuthorized(format!("order {}", id)));
        }
        Ok(order)
    }

    /// Move an order to `to` if its current status allows it.
    pub async fn transition(&self, id: &OrderId, to: OrderStatus) -> Result<Order, CommerceError> {
        let current = self.get_order(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(invalid_transition(current.status, to));
        }

        let mut patch = json!({ "status": to });
        if to == OrderStatus::Completed {
            patch["completedAt"] = serde_json::to_value(Utc::now())?;
        }

        let expected = Value::String(current.status.as_str().to_string());
        match self
            .store
            .update_if(ORDERS, id.as_str(), "status", &expected, patch)
            .await
        {
            Ok(doc) => {
                tracing::info!(order_id = %id, from = %current.status, to = %to, "order status changed");
                Ok(doc.decode()?)
            }
            Err(StoreError::PreconditionFailed { .. }) => {
                // Someone else changed the status between our read and write.
                let latest = self.get_order(id).await?;
                Err(invalid_transition(latest.status, to))
            }
            Err(StoreError::NotFound { .. }) => Err(CommerceError::OrderNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Mark an in-progress order as completed.
    pub async fn complete_order(&self, id: &OrderId) -> Result<Order, CommerceError> {
        self.transition(id, OrderStatus::Completed).await
    }

    /// Orders awaiting delivery, newest first.
    pub async fn list_pending(&self) -> Result<Vec<Order>, CommerceError> {
        self.list_by_status(OrderStatus::InProgress).await
    }

    /// Completed orders, newest first.
    pub async fn list_completed(&self) -> Result<Vec<Order>, CommerceError> {
        self.list_by_status(OrderStatus::Completed).await
    }

    /// Orders in `status`, newest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, CommerceError> {
        let value = Value::String(status.as_str().to_string());
        self.find("status", &value).await
    }

    /// A customer's orders, newest first.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let value = Value::String(user_id.to_string());
        self.find("userId", &value).await
    }

    async fn find(&self, field: &str, value: &Value) -> Result<Vec<Order>, CommerceError> {
        let docs = self.store.find_by(ORDERS, field, value).await?;
        tracing::debug!(field, count = docs.len(), "queried orders");
        docs.iter()
            .map(|doc| doc.decode().map_err(CommerceError::from))
            .collect()
    }
}

/// Uniqueness token for a placement: the key within the customer's namespace.
fn placement_token(user_id: &UserId, key: &IdempotencyKey) -> String {
    format!("{}:{}", user_id, key)
}

fn invalid_transition(from: OrderStatus, to: OrderStatus) -> CommerceError {
    CommerceError::InvalidStatusTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, Variation};
    use crate::customer::Residence;
    use crate::ids::ProductId;
    use crate::money::{Currency, Money};
    use chrono::Duration;
    use grocer_store::MemoryStore;

    fn zmw(cents: i64) -> Money {
        Money::new(cents, Currency::ZMW)
    }

    fn oil() -> Product {
        Product {
            id: ProductId::new("oil"),
            name: "Cooking Oil".to_string(),
            image: "https://images.example.com/oil.png".to_string(),
            image_alt: "Oil bottle".to_string(),
            short_description: String::new(),
            full_description: String::new(),
            price: zmw(18000),
            category: "Pantry".to_string(),
            data_ai_hint: String::new(),
            variations: vec![Variation::new("2L", zmw(-2000))],
        }
    }

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: UserId::new(id),
            username: "Natasha Phiri".to_string(),
            first_name: "Natasha".to_string(),
            last_name: "Phiri".to_string(),
            email: "natasha@example.com".to_string(),
            phone_number: "0977000111".to_string(),
            residence: Residence::Student {
                university: "University of Zambia (UNZA)".to_string(),
                hostel: "October Hostel".to_string(),
                block: None,
                room: Some("21".to_string()),
            },
            location: None,
            created_at: Utc::now(),
        }
    }

    fn cart() -> Cart {
        let p = oil();
        let mut cart = Cart::new(Currency::ZMW);
        cart.add_item(&p, &p.variations[0], 3).unwrap();
        cart
    }

    fn service() -> OrderService<MemoryStore> {
        OrderService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_place_order_snapshots_cart() {
        let orders = service();
        let user = UserId::new("u1");
        let cart = cart();

        let order = orders
            .place_order(&user, &cart, &profile("u1"), DeliverySchedule::Now, &IdempotencyKey::generate())
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.total_price, cart.total().unwrap());
        assert_eq!(order.total_price, zmw(48000));
        assert_eq!(order.items_total().unwrap(), order.total_price);
        assert_eq!(order.items.len(), cart.len());
        assert_eq!(order.delivery.recipient_name, "Natasha Phiri");
        assert_eq!(orders.get_order(&order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let orders = service();
        let err = orders
            .place_order(
                &UserId::new("u1"),
                &Cart::new(Currency::ZMW),
                &profile("u1"),
                DeliverySchedule::Now,
                &IdempotencyKey::generate(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::EmptyCart));
        assert!(orders.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_profile_rejected() {
        let err = service()
            .place_order(
                &UserId::new("u1"),
                &cart(),
                &profile("u2"),
                DeliverySchedule::Now,
                &IdempotencyKey::generate(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn test_past_schedule_rejected() {
        let schedule = DeliverySchedule::At(Utc::now() - Duration::hours(1));
        let err = service()
            .place_order(&UserId::new("u1"), &cart(), &profile("u1"), schedule, &IdempotencyKey::generate())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_duplicate_placement_collapses() {
        let orders = service();
        let user = UserId::new("u1");
        let key = IdempotencyKey::generate();

        let first = orders
            .place_order(&user, &cart(), &profile("u1"), DeliverySchedule::Now, &key)
            .await
            .unwrap();
        let second = orders
            .place_order(&user, &cart(), &profile("u1"), DeliverySchedule::Now, &key)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(orders.list_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shared_key_across_customers() {
        let orders = service();
        let key = IdempotencyKey::new("shared-key");

        let alice = orders
            .place_order(&UserId::new("alice"), &cart(), &profile("alice"), DeliverySchedule::Now, &key)
            .await
            .unwrap();

        let p = oil();
        let mut bobs_cart = Cart::new(Currency::ZMW);
        bobs_cart.add_item(&p, &p.variations[0], 5).unwrap();
        let bob = orders
            .place_order(&UserId::new("bob"), &bobs_cart, &profile("bob"), DeliverySchedule::Now, &key)
            .await
            .unwrap();

        assert_ne!(bob.id, alice.id);
        assert_eq!(bob.user_id, UserId::new("bob"));
        assert_eq!(bob.total_price, zmw(80000));
        assert_eq!(orders.list_for_user(&UserId::new("bob")).await.unwrap().len(), 1);
        assert_eq!(orders.get_order(&alice.id).await.unwrap(), alice);
    }

    #[tokio::test]
    async fn test_existing_order_of_other_customer_rejected() {
        let store = Arc::new(MemoryStore::new());
        let orders = OrderService::new(Arc::clone(&store));
        let key = IdempotencyKey::new("k1");
        let alice = orders
            .place_order(&UserId::new("alice"), &cart(), &profile("alice"), DeliverySchedule::Now, &key)
            .await
            .unwrap();

        // Bob's token already points at a body owned by alice.
        store
            .create_unique(
                ORDERS,
                &placement_token(&UserId::new("bob"), &key),
                serde_json::to_value(&alice).unwrap(),
            )
            .await
            .unwrap();

        let err = orders
            .place_order(&UserId::new("bob"), &cart(), &profile("bob"), DeliverySchedule::Now, &key)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotAuthorized(_)));
        assert!(orders.list_for_user(&UserId::new("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_order_moves_between_lists() {
        let orders = service();
        let user = UserId::new("u1");
        let placed = orders
            .place_order(&user, &cart(), &profile("u1"), DeliverySchedule::Now, &IdempotencyKey::generate())
            .await
            .unwrap();

        let completed = orders.complete_order(&placed.id).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.items, placed.items);
        assert_eq!(completed.created_at, placed.created_at);

        assert!(orders.list_pending().await.unwrap().is_empty());
        let done = orders.list_completed().await.unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, placed.id);

        let err = orders.complete_order(&placed.id).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidStatusTransition { .. }));
    }

    #[tokio::test]
    async fn test_cancel_has_no_path() {
        let orders = service();
        let placed = orders
            .place_order(&UserId::new("u1"), &cart(), &profile("u1"), DeliverySchedule::Now, &IdempotencyKey::generate())
            .await
            .unwrap();
        let err = orders
            .transition(&placed.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidStatusTransition { .. }));
    }

    #[tokio::test]
    async fn test_orders_scoped_to_owner() {
        let orders = service();
        let mine = orders
            .place_order(&UserId::new("u1"), &cart(), &profile("u1"), DeliverySchedule::Now, &IdempotencyKey::generate())
            .await
            .unwrap();
        orders
            .place_order(&UserId::new("u2"), &cart(), &profile("u2"), DeliverySchedule::Now, &IdempotencyKey::generate())
            .await
            .unwrap();

        let listed = orders.list_for_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        assert!(orders.get_order_for_user(&mine.id, &UserId::new("u1")).await.is_ok());
        let err = orders
            .get_order_for_user(&mine.id, &UserId::new("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let err = service()
            .complete_order(&OrderId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::OrderNotFound(_)));
    }
}
