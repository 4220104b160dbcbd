//! Configuration loading and representation.
//!
//! Values come from the process environment (after loading a `.env` file when
//! present). Binaries may override individual fields from their own flags.

use std::path::{Path, PathBuf};

use stockroom_inventory::{InMemoryStockStore, StockStore, StoreError};

use crate::images::LocalImageStore;
use crate::sqlite::SqliteStockStore;

pub const DEFAULT_DB_PATH: &str = "mi_inventario.db";
pub const DEFAULT_IMAGE_DIR: &str = "imagenes";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_PASSWORD: &str = "dev-password";

/// Where records are persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Records live only as long as the process.
    Memory,
    #[default]
    Sqlite,
}

impl BackendKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "memory" | "mem" => Some(Self::Memory),
            "sqlite" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Store boxed for runtime backend selection.
pub type DynStockStore = Box<dyn StockStore + Send>;

/// Load `.env` from the working directory (or a parent) into the process
/// environment. Variables already set win.
///
/// Call before logging is initialized so `RUST_LOG` from `.env` applies.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load one specific env file; `false` when it is missing or unreadable.
pub fn load_dotenv_from(path: impl AsRef<Path>) -> bool {
    dotenvy::from_path(path.as_ref()).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub db_path: PathBuf,
    pub image_dir: PathBuf,
    /// Shared password gating the dashboard.
    pub password: String,
    pub bind_addr: String,
}

impl AppConfig {
    /// Read `STOCKROOM_*` variables, loading `.env` first if present.
    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("STOCKROOM_BACKEND") {
            Some(raw) => BackendKind::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown STOCKROOM_BACKEND; using sqlite");
                BackendKind::Sqlite
            }),
            None => BackendKind::default(),
        };

        let password = get("STOCKROOM_PASSWORD").unwrap_or_else(|| {
            tracing::warn!("STOCKROOM_PASSWORD not set; using insecure dev default");
            DEV_PASSWORD.to_string()
        });

        Self {
            backend,
            db_path: get("STOCKROOM_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            image_dir: get("STOCKROOM_IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR)),
            password,
            bind_addr: get("STOCKROOM_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    /// Open the configured stock backend.
    pub fn open_store(&self) -> Result<DynStockStore, StoreError> {
        match self.backend {
            BackendKind::Memory => Ok(Box::new(InMemoryStockStore::new())),
            BackendKind::Sqlite => {
                tracing::info!(path = %self.db_path.display(), "opening sqlite stock store");
                Ok(Box::new(SqliteStockStore::open(&self.db_path)?))
            }
        }
    }

    pub fn image_store(&self) -> LocalImageStore {
        LocalImageStore::new(&self.image_dir)
    }
}
