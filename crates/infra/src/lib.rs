//! Infrastructure layer: storage backends, image store, config.

pub mod config;
pub mod images;
pub mod sheet;
pub mod sqlite;

pub use config::{AppConfig, BackendKind, DynStockStore, load_dotenv, load_dotenv_from};
pub use images::LocalImageStore;
pub use sheet::{InMemorySheet, SHEET_HEADERS, SheetClient, SheetStockStore};
pub use sqlite::SqliteStockStore;
