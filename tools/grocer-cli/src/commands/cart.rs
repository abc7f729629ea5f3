//! Cart commands.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use grocer_commerce::cart::{CartKey, CartStore};
use grocer_commerce::catalog::CatalogService;
use grocer_commerce::ProductId;
use grocer_store::DirKv;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.open_cart()?;

    match args.command {
        CartCommand::Add {
            product,
            variation,
            quantity,
        } => {
            let catalog = CatalogService::new(ctx.open_store().await?);
            let product = catalog.get_product(&ProductId::new(product)).await?;
            let variation = match variation {
                Some(name) => product.require_variation(&name)?,
                None => product
                    .default_variation()
                    .with_context(|| format!("Product {} has no variations", product.id))?,
            };

            let key = cart.add_item(&product, variation, quantity)?;
            let line = cart.cart().get(&key).map_or(quantity, |item| item.quantity);
            ctx.output.success(&format!(
                "Added {} x {} ({}), now {} in cart",
                quantity, product.name, variation.name, line
            ));
            show(&cart, ctx)
        }
        CartCommand::Remove { product, variation } => {
            let key = CartKey::new(product, variation);
            if cart.remove_item(&key) {
                ctx.output.success(&format!("Removed {}", key));
            } else {
                ctx.output.warn(&format!("{} is not in the cart", key));
            }
            show(&cart, ctx)
        }
        CartCommand::Set {
            product,
            variation,
            quantity,
        } => {
            let key = CartKey::new(product, variation);
            if cart.set_quantity(&key, quantity)? {
                ctx.output.success(&format!("Updated {}", key));
            } else {
                ctx.output.warn(&format!("{} is not in the cart", key));
            }
            show(&cart, ctx)
        }
        CartCommand::Clear { yes } => {
            if cart.cart().is_empty() {
                ctx.output.info("Cart is already empty");
                return Ok(());
            }
            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove all {} line(s) from the cart?", cart.cart().len()))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    ctx.output.warn("Clear cancelled");
                    return Ok(());
                }
            }
            cart.clear();
            ctx.output.success("Cart cleared");
            Ok(())
        }
        CartCommand::Show => show(&cart, ctx),
    }
}

fn show(cart: &CartStore<DirKv>, ctx: &Context) -> Result<()> {
    let total = cart.total()?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "items": cart.cart().items(),
            "itemCount": cart.cart().item_count(),
            "total": total,
        }));
        return Ok(());
    }

    if cart.cart().is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    let widths = [22, 26, 14, 5, 10, 10];
    ctx.output.header("Cart");
    ctx.output.table_row(&["PRODUCT", "NAME", "VARIATION", "QTY", "PRICE", "TOTAL"], &widths);
    for item in cart.cart().items() {
        let line_total = item.line_total()?;
        ctx.output.table_row(
            &[
                item.product_id.as_str(),
                item.name.as_str(),
                item.variation_name.as_str(),
                item.quantity.to_string().as_str(),
                item.unit_price.display().as_str(),
                line_total.display().as_str(),
            ],
            &widths,
        );
    }
    ctx.output.kv("Total", &total.display());
    Ok(())
}
