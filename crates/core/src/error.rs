//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable by the caller: the presentation layer decides
/// how to surface it. Storage and network failures belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed user input (non-numeric stock/price, missing required field).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Registration attempted with an identifier already present.
    #[error("identifier already exists: {0}")]
    DuplicateIdentifier(String),

    /// Lookup or adjustment on an unknown identifier.
    #[error("product not found: {0}")]
    NotFound(String),

    /// The adjustment would drive the stock quantity below zero.
    #[error("insufficient stock for {id}: on hand {on_hand}, requested change {delta}")]
    InsufficientStock { id: String, on_hand: i64, delta: i64 },
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateIdentifier(id.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn insufficient_stock(id: impl Into<String>, on_hand: i64, delta: i64) -> Self {
        Self::InsufficientStock {
            id: id.into(),
            on_hand,
            delta,
        }
    }
}
