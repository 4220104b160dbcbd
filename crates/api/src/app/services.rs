//! Service wiring: the ledger and image store shared by all handlers.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use stockroom_infra::{AppConfig, DynStockStore};
use stockroom_inventory::{ImageError, ImageRef, ImageStore, Ledger, LedgerError};

pub type DynImageStore = Box<dyn ImageStore + Send>;
pub type SharedLedger = Ledger<DynStockStore>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("ledger lock poisoned")]
    Poisoned,

    #[error("blocking task failed: {0}")]
    Join(String),
}

impl From<ImageError> for ServiceError {
    fn from(value: ImageError) -> Self {
        Self::Ledger(LedgerError::Image(value))
    }
}

/// Handles shared across requests.
///
/// Ledger operations are synchronous (and may block on the SQLite backend), so
/// every call runs on the blocking pool, one at a time behind a mutex.
#[derive(Clone)]
pub struct AppServices {
    ledger: Arc<Mutex<SharedLedger>>,
    images: Arc<Mutex<DynImageStore>>,
}

impl AppServices {
    pub fn new(ledger: SharedLedger, images: DynImageStore) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            images: Arc::new(Mutex::new(images)),
        }
    }

    /// Open the configured backend and image directory. Blocking.
    pub fn open(config: &AppConfig) -> Result<Self, LedgerError> {
        let ledger = Ledger::open(config.open_store()?)?;
        tracing::info!(records = ledger.len(), "ledger opened");
        Ok(Self::new(ledger, Box::new(config.image_store())))
    }

    /// Run `f` against the ledger on the blocking pool.
    pub async fn ledger<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut SharedLedger) -> Result<T, LedgerError> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = self.ledger.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = ledger.lock().map_err(|_| ServiceError::Poisoned)?;
            f(&mut guard).map_err(ServiceError::from)
        })
        .await
        .map_err(|e| ServiceError::Join(e.to_string()))?
    }

    pub async fn store_image(&self, file_name: String, bytes: Vec<u8>) -> Result<ImageRef, ServiceError> {
        let images = self.images.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = images.lock().map_err(|_| ServiceError::Poisoned)?;
            guard.store(&file_name, &bytes).map_err(ServiceError::from)
        })
        .await
        .map_err(|e| ServiceError::Join(e.to_string()))?
    }
}
