//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::ProductCode;
pub use value_object::{MAX_PRICE, MAX_STOCK, Price, parse_delta, parse_quantity};
