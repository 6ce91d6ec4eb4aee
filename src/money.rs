//! Money

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency code used when a cart has no lines to take a currency from.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Errors related to parsing monetary amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount string could not be parsed as a decimal number.
    #[error("invalid monetary amount {0:?}")]
    InvalidAmount(String),
}

/// Rounds an amount to 2 decimal places, half away from zero.
///
/// This matches the storefront's `toFixed(2)` formatting, so persisted
/// amounts always carry exactly two fraction digits.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// An amount plus ISO 4217 currency code, always held to 2 decimal places.
///
/// Serializes as `{"amount": "12.34", "currencyCode": "USD"}` — the amount
/// is a string on the wire, preserved verbatim from the persisted cart
/// layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    #[serde(with = "amount_string")]
    amount: Decimal,
    currency_code: String,
}

impl Money {
    /// Creates a new amount in the given currency, rounded to 2 decimal
    /// places.
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Money {
            amount: round2(amount),
            currency_code: currency_code.into(),
        }
    }

    /// A zero amount in the given currency.
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Money::new(Decimal::ZERO, currency_code)
    }

    /// Parses an amount string such as `"12.34"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidAmount`] if the string is not a decimal
    /// number.
    pub fn parse(amount: &str, currency_code: impl Into<String>) -> Result<Self, MoneyError> {
        let Ok(parsed) = amount.parse::<Decimal>() else {
            return Err(MoneyError::InvalidAmount(amount.to_string()));
        };

        Ok(Money::new(parsed, currency_code))
    }

    /// Returns the amount, always rounded to 2 decimal places.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the ISO 4217 currency code.
    #[must_use]
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Treats this amount as a unit price and extends it over a quantity,
    /// re-rounding to 2 decimal places.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Money {
        Money::new(
            self.amount * Decimal::from(quantity),
            self.currency_code.clone(),
        )
    }

    /// Reconstructs a unit price from a running line total and its quantity.
    ///
    /// Lines store only their running total, so callers stepping a quantity
    /// derive the unit price as `total / quantity`, rounded to 2 decimal
    /// places. Repeated derivation can drift by a cent; that is the
    /// storefront's long-standing behavior and is kept for compatibility.
    #[must_use]
    pub fn unit_price(&self, quantity: u32) -> Money {
        let amount = self
            .amount
            .checked_div(Decimal::from(quantity))
            .unwrap_or(Decimal::ZERO);

        Money::new(amount, self.currency_code.clone())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency_code)
    }
}

mod amount_string {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{amount:.2}"))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        let Ok(amount) = raw.parse::<Decimal>() else {
            return Err(de::Error::invalid_value(
                de::Unexpected::Str(&raw),
                &"a decimal amount string",
            ));
        };

        Ok(super::round2(amount))
    }
}
