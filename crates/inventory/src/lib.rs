//! Inventory domain module: the stock ledger.
//!
//! This crate contains the business rules for stock keeping, implemented as
//! deterministic domain logic (no IO, no HTTP, no storage). Persistence and
//! image hosting are reached through the [`StockStore`] and [`ImageStore`]
//! ports.

pub mod code;
pub mod image;
pub mod ledger;
pub mod record;
pub mod store;
pub mod valuation;

pub use code::{FALLBACK_PREFIX, fallback_code, is_fallback_code};
pub use image::{ImageError, ImageStore, ImageUpload};
pub use ledger::{Ledger, LedgerError};
pub use record::{Category, Grade, ImageRef, NewProduct, ProductForm, ProductRecord};
pub use store::{InMemoryStockStore, StockStore, StoreError, validate_records};
pub use valuation::{StockSummary, summarize, valuation};
