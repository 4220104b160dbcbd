//! SQLite-backed stock store (local relational file).

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::{Builder, Runtime};

use stockroom_core::{Price, ProductCode};
use stockroom_inventory::{
    Category, Grade, ImageRef, ProductRecord, StockStore, StoreError, validate_records,
};

/// Stock store over a single SQLite file.
///
/// The ledger contract is synchronous, so the store owns a private
/// current-thread runtime and blocks on every sqlx call. Do not call it from
/// inside an async task; use `spawn_blocking`. Dropping it is fine anywhere.
///
/// Records are addressed by their table `id` (SQLite rowid); the
/// `code -> id` index is rebuilt on every `load_all`.
pub struct SqliteStockStore {
    pool: SqlitePool,
    rows: HashMap<ProductCode, i64>,
    // `None` only while dropping.
    runtime: Option<Runtime>,
}

impl core::fmt::Debug for SqliteStockStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SqliteStockStore")
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl SqliteStockStore {
    /// Open (creating if missing) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("failed to create database directory {parent:?}: {e}"))
            })?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options)
    }

    /// Private in-memory database (tests, scratch sessions).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(unavailable)?;
        Self::connect(options)
    }

    fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to start sqlite runtime: {e}")))?;

        // One connection that never expires: an in-memory database lives and
        // dies with its connection.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )
            .map_err(unavailable)?;

        runtime
            .block_on(
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS products (
                        id       INTEGER PRIMARY KEY AUTOINCREMENT,
                        code     TEXT NOT NULL UNIQUE,
                        name     TEXT NOT NULL,
                        category TEXT NOT NULL DEFAULT '',
                        brand    TEXT NOT NULL DEFAULT '',
                        format   TEXT NOT NULL DEFAULT '',
                        grade    TEXT NOT NULL DEFAULT '',
                        stock    INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
                        price    TEXT NOT NULL DEFAULT '0',
                        image    TEXT
                    )
                    "#,
                )
                .execute(&pool),
            )
            .map_err(unavailable)?;

        Ok(Self {
            pool,
            rows: HashMap::new(),
            runtime: Some(runtime),
        })
    }

    fn runtime(&self) -> Result<&Runtime, StoreError> {
        self.runtime
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("sqlite runtime is shut down".to_string()))
    }
}

impl Drop for SqliteStockStore {
    fn drop(&mut self) {
        // A plain runtime drop panics inside async contexts; this does not.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl StockStore for SqliteStockStore {
    fn load_all(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = self
            .runtime()?
            .block_on(
                sqlx::query(
                    r#"
                    SELECT id, code, name, category, brand, format, grade, stock, price, image
                    FROM products
                    ORDER BY id
                    "#,
                )
                .fetch_all(&self.pool),
            )
            .map_err(unavailable)?;

        let mut index = HashMap::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let rowid: i64 = row.try_get("id").map_err(corrupt)?;
            let code: String = row.try_get("code").map_err(corrupt)?;
            let id = ProductCode::parse(&code)
                .ok_or_else(|| StoreError::Corrupt(format!("row {rowid} has a blank code")))?;
            let grade: String = row.try_get("grade").map_err(corrupt)?;
            let price: String = row.try_get("price").map_err(corrupt)?;
            let category: String = row.try_get("category").map_err(corrupt)?;
            let image: Option<String> = row.try_get("image").map_err(corrupt)?;

            let record = ProductRecord {
                name: row.try_get("name").map_err(corrupt)?,
                category: Category::parse(&category),
                brand: row.try_get("brand").map_err(corrupt)?,
                format: row.try_get("format").map_err(corrupt)?,
                grade: Grade::parse(&grade)
                    .map_err(|e| StoreError::Corrupt(format!("row {rowid}: {e}")))?,
                stock: row.try_get("stock").map_err(corrupt)?,
                price: Price::parse(&price)
                    .map_err(|e| StoreError::Corrupt(format!("row {rowid}: {e}")))?,
                image: image.as_deref().and_then(ImageRef::parse),
                id: id.clone(),
            };
            index.insert(id, rowid);
            records.push(record);
        }

        validate_records(&records)?;
        tracing::debug!(records = records.len(), "loaded products from sqlite");
        self.rows = index;
        Ok(records)
    }

    fn insert(&mut self, record: &ProductRecord) -> Result<(), StoreError> {
        let result = self
            .runtime()?
            .block_on(
                sqlx::query(
                    r#"
                    INSERT INTO products (code, name, category, brand, format, grade, stock, price, image)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                )
                .bind(record.id.as_str())
                .bind(&record.name)
                .bind(record.category.as_str())
                .bind(&record.brand)
                .bind(&record.format)
                .bind(record.grade.as_str())
                .bind(record.stock)
                .bind(record.price.to_string())
                .bind(record.image.as_ref().map(|i| i.as_str()))
                .execute(&self.pool),
            )
            .map_err(unavailable)?;

        self.rows.insert(record.id.clone(), result.last_insert_rowid());
        Ok(())
    }

    fn update_stock(&mut self, id: &ProductCode, quantity: i64) -> Result<(), StoreError> {
        let rowid = *self
            .rows
            .get(id)
            .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))?;

        let result = self
            .runtime()?
            .block_on(
                sqlx::query("UPDATE products SET stock = ?1 WHERE id = ?2")
                    .bind(quantity)
                    .bind(rowid)
                    .execute(&self.pool),
            )
            .map_err(unavailable)?;

        if result.rows_affected() != 1 {
            return Err(StoreError::UnknownRecord(id.to_string()));
        }
        Ok(())
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("sqlite: {err}"))
}

fn corrupt(err: sqlx::Error) -> StoreError {
    StoreError::Corrupt(format!("sqlite: {err}"))
}
