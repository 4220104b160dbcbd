//! Reporting aggregates over a set of records (not ledger invariants).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult};

use crate::record::ProductRecord;

/// Sum of `quantity × price` over `records`.
///
/// Fails with `InvalidInput` instead of overflowing.
pub fn valuation<'a, I>(records: I) -> DomainResult<Decimal>
where
    I: IntoIterator<Item = &'a ProductRecord>,
{
    records
        .into_iter()
        .try_fold(Decimal::ZERO, |total, r| {
            total.checked_add(line_value(r)?).ok_or_else(overflow)
        })
}

/// Dashboard headline figures for a (possibly filtered) table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockSummary {
    /// Number of distinct SKUs.
    pub skus: usize,
    /// Physical units on hand.
    pub units: i64,
    /// Stock value in the shop's currency.
    pub value: Decimal,
}

pub fn summarize<'a, I>(records: I) -> DomainResult<StockSummary>
where
    I: IntoIterator<Item = &'a ProductRecord>,
{
    records
        .into_iter()
        .try_fold(StockSummary::default(), |acc, r| {
            Ok::<_, DomainError>(StockSummary {
                skus: acc.skus + 1,
                units: acc.units.checked_add(r.stock).ok_or_else(overflow)?,
                value: acc.value.checked_add(line_value(r)?).ok_or_else(overflow)?,
            })
        })
}

fn line_value(r: &ProductRecord) -> DomainResult<Decimal> {
    Decimal::from(r.stock)
        .checked_mul(r.price.amount())
        .ok_or_else(overflow)
}

fn overflow() -> DomainError {
    DomainError::invalid_input("stock valuation overflows")
}
