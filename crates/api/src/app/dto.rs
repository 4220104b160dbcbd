use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Price, ProductCode};
use stockroom_inventory::{Category, Grade, ImageRef, NewProduct, ProductRecord, StockSummary};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProductRequest {
    /// Supplier code; omitted or blank to have one generated.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub grade: String,
    pub stock: i64,
    pub price: Decimal,
    /// Reference returned by `POST /inventory/images`.
    #[serde(default)]
    pub image: Option<String>,
}

impl RegisterProductRequest {
    pub fn into_new_product(self) -> DomainResult<NewProduct> {
        if self.stock < 0 {
            return Err(DomainError::invalid_input("stock cannot be negative"));
        }
        Ok(NewProduct {
            id: self.id.as_deref().and_then(ProductCode::parse),
            name: self.name,
            category: Category::parse(&self.category),
            brand: self.brand.trim().to_string(),
            format: self.format.trim().to_string(),
            grade: Grade::parse(&self.grade)?,
            stock: self.stock,
            price: Price::new(self.price)?,
            image: self.image.as_deref().and_then(ImageRef::parse),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub name: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub items: Vec<ProductRecord>,
    pub summary: StockSummary,
}

#[derive(Debug, Serialize)]
pub struct AdjustStockResponse {
    pub id: String,
    pub stock: i64,
}
