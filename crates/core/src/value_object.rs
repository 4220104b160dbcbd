//! Value objects: money and quantities as typed by users.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Largest stock quantity a single record may hold.
pub const MAX_STOCK: i64 = 1_000_000_000;

/// Largest unit price accepted, in whole currency units.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Non-negative unit price.
///
/// Stored as an exact decimal so that valuations (`quantity × price`) do not
/// accumulate floating-point error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::invalid_input(format!(
                "price cannot be negative (got {amount})"
            )));
        }
        if amount > Decimal::from(MAX_PRICE) {
            return Err(DomainError::invalid_input(format!(
                "price cannot exceed {MAX_PRICE} (got {amount})"
            )));
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse a price typed by a user.
    ///
    /// Accepts a comma as decimal separator when no dot is present (`35,50`).
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_input("price is required"));
        }
        let normalized = if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            trimmed.replace(',', ".")
        };
        let amount = Decimal::from_str(&normalized)
            .map_err(|_| DomainError::invalid_input(format!("price must be a number (got {trimmed:?})")))?;
        Self::new(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a stock quantity typed by a user (non-negative whole number).
pub fn parse_quantity(raw: &str) -> DomainResult<i64> {
    let trimmed = raw.trim();
    let quantity: i64 = trimmed
        .parse()
        .map_err(|_| DomainError::invalid_input(format!("stock must be a whole number (got {trimmed:?})")))?;
    if quantity < 0 {
        return Err(DomainError::invalid_input("stock cannot be negative"));
    }
    if quantity > MAX_STOCK {
        return Err(DomainError::invalid_input(format!("stock cannot exceed {MAX_STOCK}")));
    }
    Ok(quantity)
}

/// Parse a signed stock adjustment typed by a user (`+10`, `-5`, `3`).
pub fn parse_delta(raw: &str) -> DomainResult<i64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .parse()
        .map_err(|_| DomainError::invalid_input(format!("adjustment must be a whole number (got {trimmed:?})")))
}
