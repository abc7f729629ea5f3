//! Catalog administration commands.

use anyhow::{Context as _, Result};
use grocer_commerce::catalog::{CatalogService, NewProduct, Product, Variation};
use grocer_commerce::{Currency, Money, ProductId};

use super::{ProductArgs, ProductCommand};
use crate::context::Context;

/// Run the product command.
pub async fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    let catalog = CatalogService::new(ctx.open_store().await?);

    match args.command {
        ProductCommand::Add {
            name,
            price,
            image,
            image_alt,
            short_description,
            full_description,
            category,
            data_ai_hint,
            variations,
        } => {
            let currency = ctx.config.currency()?;
            let product = NewProduct {
                name,
                image,
                image_alt,
                short_description,
                full_description,
                price: Money::parse(&price, currency)?,
                category,
                data_ai_hint,
                variations: variations
                    .iter()
                    .map(|spec| parse_variation(spec, currency))
                    .collect::<Result<Vec<_>>>()?,
            };
            let id = catalog.add_product(product).await?;

            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({ "id": id }));
            } else {
                ctx.output.success(&format!("Added product {}", id));
            }
            Ok(())
        }
        ProductCommand::List { category, search } => {
            let products: Vec<Product> = catalog
                .search_products(search.as_deref().unwrap_or_default())
                .await?
                .into_iter()
                .filter(|p| {
                    category
                        .as_deref()
                        .map_or(true, |c| p.category.eq_ignore_ascii_case(c))
                })
                .collect();

            if ctx.output.is_json() {
                ctx.output.json(&products);
                return Ok(());
            }

            ctx.output.header(&format!("Products ({})", products.len()));
            ctx.output.table_row(&["ID", "NAME", "CATEGORY", "FROM"], &[22, 28, 14, 10]);
            for product in &products {
                let from = product
                    .variations
                    .iter()
                    .filter_map(|v| product.price_of(v).ok())
                    .min_by_key(|m| m.amount_cents)
                    .unwrap_or(product.price);
                ctx.output.table_row(
                    &[
                        product.id.as_str(),
                        product.name.as_str(),
                        product.category.as_str(),
                        from.display().as_str(),
                    ],
                    &[22, 28, 14, 10],
                );
            }
            Ok(())
        }
        ProductCommand::Show { id } => {
            let product = catalog.get_product(&ProductId::new(id)).await?;

            if ctx.output.is_json() {
                ctx.output.json(&product);
                return Ok(());
            }

            ctx.output.header(&product.name);
            ctx.output.kv("id", product.id.as_str());
            ctx.output.kv("category", &product.category);
            ctx.output.kv("price", &product.price.display());
            ctx.output.kv("image", &product.image);
            ctx.output.kv("description", &product.short_description);
            ctx.output.info("Variations:");
            for variation in &product.variations {
                let price = product
                    .price_of(variation)
                    .map(|m| m.display())
                    .unwrap_or_else(|e| e.to_string());
                ctx.output.list_item(&format!(
                    "{} ({}) = {}",
                    variation.name,
                    signed(variation.price_modifier),
                    price
                ));
            }
            Ok(())
        }
    }
}

/// Parse `NAME=MODIFIER`. The modifier may be omitted for zero.
fn parse_variation(spec: &str, currency: Currency) -> Result<Variation> {
    match spec.rsplit_once('=') {
        Some((name, modifier)) => {
            let modifier = Money::parse(modifier, currency)
                .with_context(|| format!("Invalid variation '{}'", spec))?;
            Ok(Variation::new(name.trim(), modifier))
        }
        None => Ok(Variation::new(spec.trim(), Money::zero(currency))),
    }
}

fn signed(amount: Money) -> String {
    if amount.is_negative() {
        amount.display()
    } else {
        format!("+{}", amount.display())
    }
}
