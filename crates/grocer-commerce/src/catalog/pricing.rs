//! Variation pricing.
//!
//! `line = (base + modifier) * quantity`. Pure functions, recomputed
//! wherever a price is shown or captured; nothing here is cached.

use crate::error::CommerceError;
use crate::money::Money;

/// Effective unit price of a variation.
///
/// Fails if the modifier is in another currency, if the sum overflows, or if
/// the modifier takes the price below zero.
pub fn unit_price(base_price: Money, modifier: Money) -> Result<Money, CommerceError> {
    if base_price.currency != modifier.currency {
        return Err(CommerceError::CurrencyMismatch {
            expected: base_price.currency.code().to_string(),
            got: modifier.currency.code().to_string(),
        });
    }
    let price = base_price
        .try_add(&modifier)
        .ok_or(CommerceError::Overflow)?;
    if price.is_negative() {
        return Err(CommerceError::NegativePrice(price.display()));
    }
    Ok(price)
}

/// Price of `quantity` units of a variation.
pub fn line_price(base_price: Money, modifier: Money, quantity: i64) -> Result<Money, CommerceError> {
    unit_price(base_price, modifier)?
        .try_multiply(quantity)
        .ok_or(CommerceError::Overflow)
}
