//! Checkout and order administration commands.

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use dialoguer::Confirm;
use grocer_commerce::checkout::{CheckoutService, DeliverySchedule, Order, OrderService, OrderStatus};
use grocer_commerce::{IdempotencyKey, OrderId};

use super::{OrderArgs, OrderCommand, OrderFilter};
use crate::context::Context;
use crate::output::{short_id, status_badge};

/// Run the order command.
pub async fn run(args: OrderArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store().await?;
    let orders = OrderService::new(store.clone());

    match args.command {
        OrderCommand::Place {
            at,
            idempotency_key,
        } => {
            let user = ctx.require_user()?;
            let schedule = match at.as_deref() {
                Some(at) => DeliverySchedule::At(parse_schedule(at)?),
                None => DeliverySchedule::Now,
            };
            let key = match idempotency_key {
                Some(key) => IdempotencyKey::new(key),
                None => IdempotencyKey::generate(),
            };
            ctx.output.debug(&format!("Idempotency key: {}", key));

            let mut cart = ctx.open_cart()?;
            let order = CheckoutService::new(store)
                .checkout(user, &mut cart, schedule, &key)
                .await
                .map_err(|e| {
                    if !e.is_validation() {
                        ctx.output.warn(&format!(
                            "Your cart was kept. Retry with --idempotency-key {} to avoid a duplicate order.",
                            key
                        ));
                    }
                    e
                })?;

            if ctx.output.is_json() {
                ctx.output.json(&order);
            } else {
                ctx.output.success(&format!(
                    "Order {} placed, total {}",
                    order.id,
                    order.total_price.display()
                ));
                print_order(&order, ctx);
            }
            Ok(())
        }
        OrderCommand::Show { id } => {
            let id = OrderId::new(id);
            let order = match &ctx.user {
                Some(user) => orders.get_order_for_user(&id, user).await?,
                None => orders.get_order(&id).await?,
            };

            if ctx.output.is_json() {
                ctx.output.json(&order);
            } else {
                print_order(&order, ctx);
            }
            Ok(())
        }
        OrderCommand::List { status } => {
            let (title, list) = match status {
                OrderFilter::Pending => ("Pending orders", orders.list_pending().await?),
                OrderFilter::Completed => ("Completed orders", orders.list_completed().await?),
            };
            print_orders(title, &list, ctx);
            Ok(())
        }
        OrderCommand::Mine => {
            let user = ctx.require_user()?;
            let list = orders.list_for_user(user).await?;
            print_orders("My orders", &list, ctx);
            Ok(())
        }
        OrderCommand::Complete { id, yes } => {
            let id = OrderId::new(id);
            let order = orders.get_order(&id).await?;
            if !order.status.can_transition_to(OrderStatus::Completed) {
                bail!("Order {} is already {}", id, order.status);
            }

            if !yes && !ctx.output.is_json() {
                print_order(&order, ctx);
                let confirmed = Confirm::new()
                    .with_prompt("Mark this order as completed?")
                    .default(true)
                    .interact()?;

                if !confirmed {
                    ctx.output.warn("Completion cancelled");
                    return Ok(());
                }
            }

            let order = orders.complete_order(&id).await?;
            if ctx.output.is_json() {
                ctx.output.json(&order);
            } else {
                ctx.output.success(&format!("Order {} completed", order.id));
            }
            Ok(())
        }
    }
}

/// Parse a delivery time as RFC 3339 or `YYYY-MM-DD HH:MM` in UTC.
fn parse_schedule(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(at.and_utc());
        }
    }
    bail!("Invalid delivery time '{}'. Use YYYY-MM-DD HH:MM.", input)
}

fn print_orders(title: &str, orders: &[Order], ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return;
    }

    ctx.output.header(&format!("{} ({})", title, orders.len()));
    let widths = [22, 18, 18, 12, 12];
    ctx.output.table_row(&["ORDER", "PLACED", "CUSTOMER", "TOTAL", "STATUS"], &widths);
    for order in orders {
        ctx.output.table_row(
            &[
                order.id.as_str(),
                order.created_at.format("%Y-%m-%d %H:%M").to_string().as_str(),
                short_id(order.user_id.as_str()).as_str(),
                order.total_price.display().as_str(),
                order.status.display_name(),
            ],
            &widths,
        );
    }
}

fn print_order(order: &Order, ctx: &Context) {
    ctx.output.header(&format!("Order {}", order.id));
    ctx.output.kv("status", &status_badge(order.status));
    ctx.output.kv("placed", &order.created_at.format("%Y-%m-%d %H:%M UTC").to_string());
    if let Some(at) = order.completed_at {
        ctx.output.kv("completed", &at.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    ctx.output.kv("customer", order.user_id.as_str());
    ctx.output.kv("recipient", &order.delivery.recipient_name);
    ctx.output.kv("phone", &order.delivery.phone_number);
    ctx.output.kv("address", &order.delivery.destination.describe());
    ctx.output.kv("delivery", &order.delivery.schedule.display());
    for item in &order.items {
        ctx.output.list_item(&format!(
            "{} x {} ({}) @ {}",
            item.quantity,
            item.name,
            item.variation_name,
            item.price.display()
        ));
    }
    ctx.output.kv("total", &order.total_price.display());
}
