//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. Decimal input and
//! output goes through [`rust_decimal::Decimal`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommerceError;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Zambian kwacha.
    #[default]
    ZMW,
    USD,
}

impl Currency {
    /// Get the currency code (e.g., "ZMW").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::ZMW => "ZMW",
            Currency::USD => "USD",
        }
    }

    /// Get the currency symbol (e.g., "K").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::ZMW => "K",
            Currency::USD => "$",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "ZMW" => Some(Currency::ZMW),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (ngwee for ZMW).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Create a Money value from a decimal amount, rounding half away from
    /// zero to the currency's precision.
    ///
    /// Returns `None` if the amount does not fit.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Option<Self> {
        let places = currency.decimal_places();
        let scaled = amount
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(10_i64.pow(places)))?;
        Some(Self::new(scaled.to_i64()?, currency))
    }

    /// Parse a decimal string such as `"180"`, `"-20.5"` or `"49.99"`.
    pub fn parse(input: &str, currency: Currency) -> Result<Self, CommerceError> {
        let amount = Decimal::from_str(input.trim())
            .map_err(|e| CommerceError::Validation(format!("invalid amount '{}': {}", input, e)))?;
        Self::from_decimal(amount, currency).ok_or(CommerceError::Overflow)
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_cents, self.currency.decimal_places())
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format as a display string (e.g., "K49.99").
    pub fn display(&self) -> String {
        if self.is_negative() {
            format!("-{}{}", self.currency.symbol(), self.abs_amount())
        } else {
            format!("{}{}", self.currency.symbol(), self.abs_amount())
        }
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        self.to_decimal().to_string()
    }

    fn abs_amount(&self) -> String {
        self.to_decimal().abs().to_string()
    }

    /// Try to add another Money value, returning None if currencies don't
    /// match or the sum overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(Money::new(
            self.amount_cents.checked_add(other.amount_cents)?,
            self.currency,
        ))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(Money::new(
            self.amount_cents.checked_sub(other.amount_cents)?,
            self.currency,
        ))
    }

    /// Multiply by a scalar, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        Some(Money::new(
            self.amount_cents.checked_mul(factor)?,
            self.currency,
        ))
    }

    /// Sum an iterator of Money values.
    ///
    /// Returns None on overflow or if any value is in another currency.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
