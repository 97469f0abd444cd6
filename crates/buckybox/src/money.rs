//! Monetary amounts
//!
//! The API sends prices, fees and balances either as JSON numbers or as
//! numeric strings. [`Money`] holds them as an exact decimal so that
//! `"12.50"` and `12.5` compare equal and never pick up float error.

use crate::coerce::CoercionError;
use crate::value::Value;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An exact monetary amount, in the webstore's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wrap a decimal amount.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build from an amount in cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse from a JSON number or numeric string.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] for any other JSON shape, or for a string
    /// that is not a decimal number.
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, CoercionError> {
        parse_amount(&Value::from(raw.clone()))
    }

    /// Coercion used in type maps for money attributes.
    ///
    /// Already-coerced values pass through unchanged.
    pub fn coerce(value: Value) -> Result<Value, CoercionError> {
        parse_amount(&value).map(Value::Money)
    }

    /// The underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount in cents, rounded half away from zero.
    pub fn cents(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Whether the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

fn parse_amount(value: &Value) -> Result<Money, CoercionError> {
    match value {
        Value::Money(money) => Ok(*money),
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        other => Err(CoercionError::new(format!(
            "expected a number or numeric string, got {other}"
        ))),
    }
}

fn parse_decimal(text: &str) -> Result<Money, CoercionError> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(Money)
        .map_err(|e| CoercionError::new(format!("invalid amount {text:?}: {e}")))
}

impl FromStr for Money {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s.trim())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
