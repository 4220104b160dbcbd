use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Price, ProductCode};

/// Product family, as labelled on the shop floor.
///
/// Known families are enumerated; anything else is kept as free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Tile,
    Sanitary,
    Faucet,
    Adhesive,
    Grout,
    Other(String),
}

impl Category {
    pub const OTHER_LABEL: &'static str = "Otros";

    /// Parse a category label. Never fails: unknown labels become `Other`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match fold(trimmed).as_str() {
            "mayolica" | "tile" => Self::Tile,
            "sanitario" | "sanitary" => Self::Sanitary,
            "griferia" | "faucet" => Self::Faucet,
            "pegamento" | "adhesive" => Self::Adhesive,
            "fragua" | "grout" => Self::Grout,
            "" | "otros" | "otro" | "other" => Self::Other(Self::OTHER_LABEL.to_string()),
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Tile => "Mayólica",
            Self::Sanitary => "Sanitario",
            Self::Faucet => "Grifería",
            Self::Adhesive => "Pegamento",
            Self::Grout => "Fragua",
            Self::Other(label) => label,
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

/// Quality grade of a tile batch. Items without grading use `Standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    Commercial,
    Extra,
    Unique,
    #[default]
    Standard,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Commercial, Grade::Extra, Grade::Unique, Grade::Standard];

    /// Parse a grade label; blank input is `Standard`.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match fold(raw.trim()).as_str() {
            "comercial" | "commercial" => Ok(Self::Commercial),
            "extra" => Ok(Self::Extra),
            "unica" | "unique" => Ok(Self::Unique),
            "" | "estandar" | "estandar (no aplica)" | "standard" => Ok(Self::Standard),
            _ => Err(DomainError::invalid_input(format!(
                "unknown quality grade {:?} (expected one of: Comercial, Extra, Única, Estándar)",
                raw.trim()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commercial => "Comercial",
            Self::Extra => "Extra",
            Self::Unique => "Única",
            Self::Standard => "Estándar (No aplica)",
        }
    }
}

impl core::fmt::Display for Grade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Grade {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Grade> for String {
    fn from(value: Grade) -> Self {
        value.as_str().to_string()
    }
}

/// Opaque reference (path or URL) returned by an image store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// `None` for blank references (backends store "no image" as an empty cell).
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stocked product.
///
/// Only `stock` ever changes after registration, and only through
/// [`Ledger::adjust_stock`](crate::Ledger::adjust_stock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductCode,
    pub name: String,
    pub category: Category,
    pub brand: String,
    pub format: String,
    pub grade: Grade,
    pub stock: i64,
    pub price: Price,
    pub image: Option<ImageRef>,
}

impl ProductRecord {
    /// String form of every field, in storage column order.
    pub fn field_strings(&self) -> [String; 9] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.category.to_string(),
            self.brand.clone(),
            self.format.clone(),
            self.grade.to_string(),
            self.stock.to_string(),
            self.price.to_string(),
            self.image.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        ]
    }

    /// Case-insensitive substring match on any field. `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.field_strings()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Registration request. `id: None` asks the ledger to generate a fallback code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: Option<ProductCode>,
    pub name: String,
    pub category: Category,
    pub brand: String,
    pub format: String,
    pub grade: Grade,
    pub stock: i64,
    pub price: Price,
    pub image: Option<ImageRef>,
}

/// Raw text of a registration form, as typed by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub format: String,
    pub grade: String,
    pub stock: String,
    pub price: String,
}

impl ProductForm {
    /// Validate and convert the form. Fails with `InvalidInput` on missing name or
    /// non-numeric stock/price.
    pub fn parse(&self) -> DomainResult<NewProduct> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("name is required"));
        }
        Ok(NewProduct {
            id: ProductCode::parse(&self.id),
            name: name.to_string(),
            category: Category::parse(&self.category),
            brand: self.brand.trim().to_string(),
            format: self.format.trim().to_string(),
            grade: Grade::parse(&self.grade)?,
            stock: stockroom_core::parse_quantity(&self.stock)?,
            price: Price::parse(&self.price)?,
            image: None,
        })
    }
}

/// Lowercase and strip the Spanish accents used in shop labels.
fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            id: " 110016549 ".to_string(),
            name: "Cayalti Gris".to_string(),
            category: "mayolica".to_string(),
            brand: "Celima".to_string(),
            format: "45x45".to_string(),
            grade: "Comercial".to_string(),
            stock: "20".to_string(),
            price: "35.50".to_string(),
        }
    }

    #[test]
    fn category_labels_are_accent_and_case_insensitive() {
        assert_eq!(Category::parse("Mayólica"), Category::Tile);
        assert_eq!(Category::parse("GRIFERIA"), Category::Faucet);
        assert_eq!(Category::parse("  fragua "), Category::Grout);
        assert_eq!(Category::parse(""), Category::Other("Otros".to_string()));
        assert_eq!(Category::parse("Sellador"), Category::Other("Sellador".to_string()));
    }

    #[test]
    fn grade_rejects_unknown_labels() {
        assert_eq!(Grade::parse("única").unwrap(), Grade::Unique);
        assert_eq!(Grade::parse("").unwrap(), Grade::Standard);
        assert_eq!(Grade::parse("Estándar (No aplica)").unwrap(), Grade::Standard);
        assert!(matches!(Grade::parse("Premium"), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn form_parses_into_new_product() {
        let new = form().parse().unwrap();
        assert_eq!(new.id, ProductCode::parse("110016549"));
        assert_eq!(new.category, Category::Tile);
        assert_eq!(new.grade, Grade::Commercial);
        assert_eq!(new.stock, 20);
        assert_eq!(new.price, Price::parse("35.5").unwrap());
    }

    #[test]
    fn form_requires_name_and_numeric_fields() {
        let mut missing_name = form();
        missing_name.name = "   ".to_string();
        assert!(matches!(missing_name.parse(), Err(DomainError::InvalidInput(_))));

        let mut bad_stock = form();
        bad_stock.stock = "diez".to_string();
        assert!(matches!(bad_stock.parse(), Err(DomainError::InvalidInput(_))));

        let mut bad_price = form();
        bad_price.price = "S/.".to_string();
        assert!(matches!(bad_price.parse(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn blank_form_id_requests_generated_code() {
        let mut f = form();
        f.id = "  ".to_string();
        assert_eq!(f.parse().unwrap().id, None);
    }
}
