//! End-to-end storefront flows over the in-process stores.

use std::sync::Arc;

use grocer_commerce::cart::DEFAULT_MAX_QUANTITY_PER_ITEM;
use grocer_commerce::prelude::*;
use grocer_store::{DirKv, MemoryKv, MemoryStore};

fn zmw(cents: i64) -> Money {
    Money::new(cents, Currency::ZMW)
}

fn mealie_meal() -> NewProduct {
    NewProduct {
        name: "Breakfast Mealie Meal".to_string(),
        image: "https://images.example.com/mealie-meal.png".to_string(),
        image_alt: "Bag of mealie meal".to_string(),
        short_description: "Fine white maize meal".to_string(),
        full_description: "Breakfast grade maize meal for nshima.".to_string(),
        price: zmw(18000),
        category: "Staples".to_string(),
        data_ai_hint: "maize meal".to_string(),
        variations: vec![
            Variation::new("25kg", zmw(-2000)),
            Variation::new("50kg", zmw(14000)),
        ],
    }
}

fn student_profile() -> NewProfile {
    NewProfile {
        first_name: "Ab".to_string(),
        last_name: "Lungu".to_string(),
        email: "ab.lungu@example.com".to_string(),
        phone_number: "0911000222".to_string(),
        residence: Residence::Student {
            university: "University of Zambia (UNZA)".to_string(),
            hostel: "X".to_string(),
            block: None,
            room: None,
        },
        location: None,
    }
}

async fn seeded(store: &Arc<MemoryStore>) -> Product {
    let catalog = CatalogService::new(Arc::clone(store));
    let id = catalog.add_product(mealie_meal()).await.unwrap();
    catalog.get_product(&id).await.unwrap()
}

#[tokio::test]
async fn cart_accumulates_and_empties() {
    let store = Arc::new(MemoryStore::new());
    let product = seeded(&store).await;
    let variation = product.require_variation("25kg").unwrap();

    let mut cart = CartStore::open(MemoryKv::new(), Currency::ZMW, DEFAULT_MAX_QUANTITY_PER_ITEM);
    let key = cart.add_item(&product, variation, 2).unwrap();
    assert_eq!(cart.total().unwrap().display_amount(), "320.00");

    cart.add_item(&product, variation, 1).unwrap();
    assert_eq!(cart.cart().get(&key).unwrap().quantity, 3);
    assert_eq!(cart.total().unwrap().display_amount(), "480.00");

    cart.set_quantity(&key, 0).unwrap();
    assert!(cart.cart().is_empty());
}

#[tokio::test]
async fn order_placed_and_completed() {
    let store = Arc::new(MemoryStore::new());
    let product = seeded(&store).await;
    let user = UserId::new("student-a");
    ProfileService::new(Arc::clone(&store))
        .create_profile(&user, student_profile())
        .await
        .unwrap();

    let mut cart = CartStore::open(MemoryKv::new(), Currency::ZMW, DEFAULT_MAX_QUANTITY_PER_ITEM);
    cart.add_item(&product, product.require_variation("25kg").unwrap(), 3)
        .unwrap();
    let cart_total = cart.total().unwrap();
    let cart_lines = cart.cart().len();

    let order = CheckoutService::new(Arc::clone(&store))
        .checkout(&user, &mut cart, DeliverySchedule::Now, &IdempotencyKey::generate())
        .await
        .unwrap();
    assert_eq!(order.total_price, cart_total);
    assert_eq!(order.total_price.display(), "K480.00");
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.items.len(), cart_lines);
    assert!(cart.cart().is_empty());

    let orders = OrderService::new(Arc::clone(&store));
    assert_eq!(orders.list_pending().await.unwrap().len(), 1);
    assert!(orders.list_completed().await.unwrap().is_empty());

    orders.complete_order(&order.id).await.unwrap();

    assert!(orders
        .list_pending()
        .await
        .unwrap()
        .iter()
        .all(|o| o.id != order.id));
    let completed = orders.list_completed().await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, order.id);
    assert_eq!(completed[0].status, OrderStatus::Completed);
    assert_eq!(completed[0].items, order.items);
    assert_eq!(completed[0].total_price, order.total_price);
    assert_eq!(completed[0].delivery, order.delivery);
}

#[tokio::test]
async fn resubmitted_checkout_writes_one_order() {
    let store = Arc::new(MemoryStore::new());
    let product = seeded(&store).await;
    let user = UserId::new("student-a");
    ProfileService::new(Arc::clone(&store))
        .create_profile(&user, student_profile())
        .await
        .unwrap();
    let orders = OrderService::new(Arc::clone(&store));
    let key = IdempotencyKey::generate();

    let mut cart = Cart::new(Currency::ZMW);
    cart.add_item(&product, &product.variations[1], 1).unwrap();
    let profile = ProfileService::new(Arc::clone(&store))
        .require_profile(&user)
        .await
        .unwrap();

    let first = orders
        .place_order(&user, &cart, &profile, DeliverySchedule::Now, &key)
        .await
        .unwrap();
    let retry = orders
        .place_order(&user, &cart, &profile, DeliverySchedule::Now, &key)
        .await
        .unwrap();

    assert_eq!(first.id, retry.id);
    assert_eq!(orders.list_for_user(&user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("database.json");
    let local = dir.path().join("local");
    let user = UserId::new("student-a");

    let order_id = {
        let store = Arc::new(MemoryStore::open(&db_path).await.unwrap());
        let product = seeded(&store).await;
        ProfileService::new(Arc::clone(&store))
            .create_profile(&user, student_profile())
            .await
            .unwrap();

        let mut cart = CartStore::open(DirKv::open(&local).unwrap(), Currency::ZMW, 10);
        cart.add_item(&product, &product.variations[0], 2).unwrap();
        let order = CheckoutService::new(store)
            .checkout(&user, &mut cart, DeliverySchedule::Now, &IdempotencyKey::generate())
            .await
            .unwrap();

        cart.add_item(&product, &product.variations[1], 1).unwrap();
        order.id
    };

    let store = Arc::new(MemoryStore::open(&db_path).await.unwrap());
    let orders = OrderService::new(Arc::clone(&store));
    let order = orders.get_order_for_user(&order_id, &user).await.unwrap();
    assert_eq!(order.total_price, zmw(32000));

    let cart = CartStore::open(DirKv::open(&local).unwrap(), Currency::ZMW, 10);
    assert_eq!(cart.cart().len(), 1);
    assert_eq!(cart.total().unwrap(), zmw(32000));
}

#[test]
fn total_matches_reference_over_mutations() {
    let product = Product {
        id: ProductId::new("7"),
        name: "Sugar".to_string(),
        image: "https://images.example.com/sugar.png".to_string(),
        image_alt: "Sugar".to_string(),
        short_description: String::new(),
        full_description: String::new(),
        price: zmw(4550),
        category: "Pantry".to_string(),
        data_ai_hint: String::new(),
        variations: vec![
            Variation::new("1kg", zmw(0)),
            Variation::new("2kg", zmw(4000)),
            Variation::new("5kg", zmw(17525)),
        ],
    };

    let mut cart = Cart::new(Currency::ZMW);
    let mut reference = [0_i64; 3];
    for step in 0..60_usize {
        let slot = step % 3;
        let variation = &product.variations[slot];
        let key = CartKey::new(product.id.clone(), variation.name.clone());
        match step % 5 {
            0 | 1 | 2 => {
                let quantity = (step % 4 + 1) as i64;
                if reference[slot] + quantity <= DEFAULT_MAX_QUANTITY_PER_ITEM {
                    cart.add_item(&product, variation, quantity).unwrap();
                    reference[slot] += quantity;
                }
            }
            3 => {
                let quantity = (step % 7) as i64;
                cart.set_quantity(&key, quantity).unwrap();
                if quantity < 1 || reference[slot] > 0 {
                    reference[slot] = quantity.max(0);
                }
            }
            _ => {
                cart.remove_item(&key);
                reference[slot] = 0;
            }
        }

        let expected: i64 = product
            .variations
            .iter()
            .zip(reference.iter())
            .map(|(v, q)| (product.price.amount_cents + v.price_modifier.amount_cents) * q)
            .sum();
        assert_eq!(cart.total().unwrap(), zmw(expected), "step {}", step);
    }
}
