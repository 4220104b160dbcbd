//! Persistence port for the ledger.

use std::collections::HashSet;

use thiserror::Error;

use stockroom_core::{MAX_STOCK, ProductCode};

use crate::record::ProductRecord;

/// Backend failure. The operation that hit it was not applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connectivity/auth/IO failure talking to the backend.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// The backend returned data the ledger cannot accept.
    #[error("storage backend holds invalid data: {0}")]
    Corrupt(String),

    /// The backend has no storage location for this identifier.
    #[error("no storage location for {0}")]
    UnknownRecord(String),
}

/// Durable storage for product records.
///
/// Implementations translate records to their native row shape and keep their
/// own identifier → storage-location index; that index never leaks into the
/// ledger.
pub trait StockStore {
    /// Read every record, in insertion order.
    fn load_all(&mut self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Append a new record.
    fn insert(&mut self, record: &ProductRecord) -> Result<(), StoreError>;

    /// Overwrite the stock quantity of one record, leaving every other field alone.
    fn update_stock(&mut self, id: &ProductCode, quantity: i64) -> Result<(), StoreError>;
}

/// Reject a loaded table the ledger cannot hold.
///
/// Backends call this before swapping in a freshly built location index, so a
/// corrupt read leaves their previous index in place.
pub fn validate_records(records: &[ProductRecord]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !(0..=MAX_STOCK).contains(&record.stock) {
            return Err(StoreError::Corrupt(format!(
                "stock {} out of range for {}",
                record.stock, record.id
            )));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(StoreError::Corrupt(format!("duplicate identifier {}", record.id)));
        }
    }
    Ok(())
}

impl<S> StockStore for Box<S>
where
    S: StockStore + ?Sized,
{
    fn load_all(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
        (**self).load_all()
    }

    fn insert(&mut self, record: &ProductRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn update_stock(&mut self, id: &ProductCode, quantity: i64) -> Result<(), StoreError> {
        (**self).update_stock(id, quantity)
    }
}

/// In-memory store (CLI scratch sessions, tests).
#[derive(Debug, Default, Clone)]
pub struct InMemoryStockStore {
    rows: Vec<ProductRecord>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(rows: Vec<ProductRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ProductRecord] {
        &self.rows
    }
}

impl StockStore for InMemoryStockStore {
    fn load_all(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
        Ok(self.rows.clone())
    }

    fn insert(&mut self, record: &ProductRecord) -> Result<(), StoreError> {
        self.rows.push(record.clone());
        Ok(())
    }

    fn update_stock(&mut self, id: &ProductCode, quantity: i64) -> Result<(), StoreError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))?;
        row.stock = quantity;
        Ok(())
    }
}
