//! Spreadsheet-row stock store.
//!
//! Maps each record to one row of a worksheet whose first row holds column
//! headers. The network client for a hosted spreadsheet sits behind
//! [`SheetClient`]; [`InMemorySheet`] implements it locally.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use stockroom_core::{Price, ProductCode};
use stockroom_inventory::{
    Category, Grade, ImageRef, ProductRecord, StockStore, StoreError, validate_records,
};

/// Column headers, in the order new rows are written.
pub const SHEET_HEADERS: [&str; 9] = [
    "id", "nombre", "categoria", "marca", "formato", "calidad", "stock", "precio", "imagen",
];

/// Minimal worksheet API. Rows and columns are 1-based, as in spreadsheet UIs.
pub trait SheetClient {
    /// Every row, header included, as displayed strings.
    fn get_all_values(&mut self) -> Result<Vec<Vec<String>>, StoreError>;

    fn append_row(&mut self, row: Vec<String>) -> Result<(), StoreError>;

    fn update_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), StoreError>;
}

/// Worksheet held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemorySheet {
    rows: Vec<Vec<String>>,
}

impl InMemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row.checked_sub(1)?)?
            .get(col.checked_sub(1)?)
            .map(String::as_str)
    }
}

impl SheetClient for InMemorySheet {
    fn get_all_values(&mut self) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self.rows.clone())
    }

    fn append_row(&mut self, row: Vec<String>) -> Result<(), StoreError> {
        self.rows.push(row);
        Ok(())
    }

    fn update_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), StoreError> {
        let cells = row
            .checked_sub(1)
            .and_then(|r| self.rows.get_mut(r))
            .ok_or_else(|| StoreError::UnknownRecord(format!("sheet row {row}")))?;
        let col0 = col
            .checked_sub(1)
            .ok_or_else(|| StoreError::UnknownRecord(format!("sheet column {col}")))?;
        if cells.len() <= col0 {
            cells.resize(col0 + 1, String::new());
        }
        cells[col0] = value;
        Ok(())
    }
}

/// Header name -> 0-based column position.
#[derive(Debug, Clone)]
struct Columns {
    positions: HashMap<String, usize>,
    width: usize,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, StoreError> {
        let positions: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();
        for required in ["id", "stock"] {
            if !positions.contains_key(required) {
                return Err(StoreError::Corrupt(format!(
                    "sheet header is missing the {required:?} column"
                )));
            }
        }
        Ok(Self {
            positions,
            width: header.len(),
        })
    }

    fn standard() -> Self {
        Self {
            positions: SHEET_HEADERS
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), i))
                .collect(),
            width: SHEET_HEADERS.len(),
        }
    }

    fn get<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.positions
            .get(name)
            .and_then(|&i| row.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Stock store over a worksheet.
///
/// Data row `i` (0-based, header excluded) lives at sheet row `i + 2`. The
/// `code -> sheet row` index is rebuilt on every `load_all`; an adjustment
/// rewrites exactly one cell.
#[derive(Debug)]
pub struct SheetStockStore<C> {
    client: C,
    columns: Option<Columns>,
    rows: HashMap<ProductCode, usize>,
    next_row: usize,
}

impl<C: SheetClient> SheetStockStore<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            columns: None,
            rows: HashMap::new(),
            next_row: 2,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    fn columns(&self) -> Result<&Columns, StoreError> {
        self.columns
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("sheet has not been loaded".to_string()))
    }
}

impl<C: SheetClient> StockStore for SheetStockStore<C> {
    fn load_all(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
        let values = self.client.get_all_values()?;

        let Some((header, data)) = values.split_first() else {
            let header: Vec<String> = SHEET_HEADERS.iter().map(|h| h.to_string()).collect();
            self.client.append_row(header)?;
            self.columns = Some(Columns::standard());
            self.rows.clear();
            self.next_row = 2;
            return Ok(Vec::new());
        };

        let columns = Columns::from_header(header)?;
        let mut index = HashMap::with_capacity(data.len());
        let mut records = Vec::with_capacity(data.len());

        for (i, row) in data.iter().enumerate() {
            let sheet_row = i + 2;
            let Some(id) = ProductCode::parse(columns.get(row, "id")) else {
                tracing::warn!(sheet_row, "skipping sheet row without an id");
                continue;
            };

            let grade = Grade::parse(columns.get(row, "calidad")).unwrap_or_else(|e| {
                tracing::warn!(sheet_row, error = %e, "unreadable grade, using the default");
                Grade::default()
            });

            records.push(ProductRecord {
                id: id.clone(),
                name: columns.get(row, "nombre").trim().to_string(),
                category: Category::parse(columns.get(row, "categoria")),
                brand: columns.get(row, "marca").trim().to_string(),
                format: columns.get(row, "formato").trim().to_string(),
                grade,
                stock: coerce_stock(columns.get(row, "stock"), sheet_row),
                price: coerce_price(columns.get(row, "precio"), sheet_row),
                image: ImageRef::parse(columns.get(row, "imagen")),
            });
            index.insert(id, sheet_row);
        }

        validate_records(&records)?;
        tracing::debug!(records = records.len(), "loaded products from sheet");
        self.next_row = values.len() + 1;
        self.columns = Some(columns);
        self.rows = index;
        Ok(records)
    }

    fn insert(&mut self, record: &ProductRecord) -> Result<(), StoreError> {
        let columns = self.columns()?;
        let mut row = vec![String::new(); columns.width];
        for (name, value) in SHEET_HEADERS.iter().zip(record.field_strings()) {
            if let Some(pos) = columns.position(name) {
                row[pos] = value;
            }
        }

        self.client.append_row(row)?;
        self.rows.insert(record.id.clone(), self.next_row);
        self.next_row += 1;
        Ok(())
    }

    fn update_stock(&mut self, id: &ProductCode, quantity: i64) -> Result<(), StoreError> {
        let stock_col = self
            .columns()?
            .position("stock")
            .ok_or_else(|| StoreError::Corrupt("sheet has no stock column".to_string()))?;
        let row = *self
            .rows
            .get(id)
            .ok_or_else(|| StoreError::UnknownRecord(id.to_string()))?;
        self.client.update_cell(row, stock_col + 1, quantity.to_string())
    }
}

/// Non-numeric stock cells read as zero.
fn coerce_stock(raw: &str, sheet_row: usize) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return n;
    }
    match Decimal::from_str(trimmed).ok().and_then(|d| d.trunc().to_i64()) {
        Some(n) => n,
        None => {
            tracing::warn!(sheet_row, value = trimmed, "non-numeric stock cell read as 0");
            0
        }
    }
}

/// Non-numeric (or negative) price cells read as zero.
fn coerce_price(raw: &str, sheet_row: usize) -> Price {
    if raw.trim().is_empty() {
        return Price::ZERO;
    }
    Price::parse(raw).unwrap_or_else(|e| {
        tracing::warn!(sheet_row, error = %e, "unreadable price cell read as 0");
        Price::ZERO
    })
}
