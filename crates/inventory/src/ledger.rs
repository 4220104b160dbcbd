use std::collections::HashMap;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use stockroom_core::{DomainError, MAX_STOCK, ProductCode};

use crate::code::fallback_code;
use crate::image::{ImageError, ImageStore, ImageUpload};
use crate::record::{NewProduct, ProductRecord};
use crate::store::{StockStore, StoreError, validate_records};

/// Error returned by ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl LedgerError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// The record store plus the operations that read and mutate it.
///
/// Records are held in insertion order with an identifier index on the side.
/// Every mutation is written to the backend first and applied in memory only
/// after the backend accepted it, so a failed operation leaves no trace.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    records: Vec<ProductRecord>,
    index: HashMap<ProductCode, usize>,
    rng: StdRng,
}

impl<S: StockStore> Ledger<S> {
    /// Load every record from `store`.
    pub fn open(store: S) -> Result<Self, LedgerError> {
        let mut ledger = Self {
            store,
            records: Vec::new(),
            index: HashMap::new(),
            rng: StdRng::from_entropy(),
        };
        ledger.reload()?;
        Ok(ledger)
    }

    /// Seed the fallback-identifier generator (deterministic tests).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Re-read the backend, replacing the in-memory table.
    ///
    /// On failure the previous table is kept.
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        let records = self.store.load_all()?;
        validate_records(&records)?;
        let index = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id.clone(), pos))
            .collect();
        tracing::debug!(records = records.len(), "ledger loaded");
        self.records = records;
        self.index = index;
        Ok(())
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exact lookup; both sides are compared in trimmed string form.
    pub fn find_by_identifier(&self, id: &str) -> Result<&ProductRecord, DomainError> {
        let key = id.trim();
        self.index
            .get(key)
            .map(|&pos| &self.records[pos])
            .ok_or_else(|| DomainError::not_found(key))
    }

    /// Case-insensitive substring search across every field of every record.
    ///
    /// A blank query returns everything. Order follows insertion order.
    pub fn search(&self, query: &str) -> Vec<&ProductRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|r| r.matches_lowercase(&needle))
            .collect()
    }

    /// Register a new record. Without an identifier a fallback code is generated.
    pub fn register(&mut self, new: NewProduct) -> Result<&ProductRecord, LedgerError> {
        let record = self.prepare(new)?;
        self.commit(record)
    }

    /// Register a new record, storing its photo first.
    ///
    /// The identifier is resolved before any image bytes are written, so a
    /// duplicate registration leaves the image store untouched. If the backend
    /// then rejects the record, the stored photo is discarded again.
    pub fn register_with_image<I>(
        &mut self,
        new: NewProduct,
        upload: Option<ImageUpload>,
        images: &mut I,
    ) -> Result<&ProductRecord, LedgerError>
    where
        I: ImageStore + ?Sized,
    {
        let mut record = self.prepare(new)?;
        let Some(upload) = upload else {
            return self.commit(record);
        };

        let image = images.store(&upload.file_name, &upload.bytes)?;
        record.image = Some(image.clone());
        if let Err(err) = self.store.insert(&record) {
            if let Err(discard) = images.discard(&image) {
                tracing::warn!(image = %image, error = %discard, "orphaned product image");
            }
            return Err(err.into());
        }
        Ok(self.apply(record))
    }

    /// Apply a signed delta to one record's stock and return the new quantity.
    ///
    /// A zero delta succeeds without touching the backend.
    pub fn adjust_stock(&mut self, id: &str, delta: i64) -> Result<i64, LedgerError> {
        let key = id.trim();
        let pos = *self
            .index
            .get(key)
            .ok_or_else(|| DomainError::not_found(key))?;
        let record = &self.records[pos];
        let current = record.stock;
        if delta == 0 {
            return Ok(current);
        }

        let new_quantity = current
            .checked_add(delta)
            .ok_or_else(|| DomainError::invalid_input("adjustment overflows the stock quantity"))?;
        if new_quantity < 0 {
            return Err(DomainError::insufficient_stock(key, current, delta).into());
        }
        if new_quantity > MAX_STOCK {
            return Err(DomainError::invalid_input(format!("stock cannot exceed {MAX_STOCK}")).into());
        }

        self.store.update_stock(&record.id, new_quantity)?;
        self.records[pos].stock = new_quantity;
        tracing::info!(product = %key, delta, stock = new_quantity, "stock adjusted");
        Ok(new_quantity)
    }

    fn prepare(&mut self, new: NewProduct) -> Result<ProductRecord, DomainError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("name is required"));
        }
        if new.stock < 0 {
            return Err(DomainError::invalid_input("initial stock cannot be negative"));
        }
        if new.stock > MAX_STOCK {
            return Err(DomainError::invalid_input(format!(
                "initial stock cannot exceed {MAX_STOCK}"
            )));
        }

        let id = match new.id {
            Some(id) => {
                if self.index.contains_key(id.as_str()) {
                    return Err(DomainError::duplicate(id.as_str()));
                }
                id
            }
            None => {
                let index = &self.index;
                fallback_code(&mut self.rng, Utc::now().timestamp_millis(), |c| {
                    index.contains_key(c)
                })
            }
        };

        Ok(ProductRecord {
            id,
            name: name.to_string(),
            category: new.category,
            brand: new.brand,
            format: new.format,
            grade: new.grade,
            stock: new.stock,
            price: new.price,
            image: new.image,
        })
    }

    fn commit(&mut self, record: ProductRecord) -> Result<&ProductRecord, LedgerError> {
        self.store.insert(&record)?;
        Ok(self.apply(record))
    }

    fn apply(&mut self, record: ProductRecord) -> &ProductRecord {
        let pos = self.records.len();
        tracing::info!(product = %record.id, name = %record.name, stock = record.stock, "product registered");
        self.index.insert(record.id.clone(), pos);
        self.records.push(record);
        &self.records[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::is_fallback_code;
    use crate::record::{Category, Grade, ImageRef};
    use crate::store::InMemoryStockStore;
    use stockroom_core::Price;

    fn new_product(id: &str, name: &str, stock: i64, price: &str) -> NewProduct {
        NewProduct {
            id: ProductCode::parse(id),
            name: name.to_string(),
            category: Category::Tile,
            brand: "Celima".to_string(),
            format: "45x45".to_string(),
            grade: Grade::Commercial,
            stock,
            price: Price::parse(price).unwrap(),
            image: None,
        }
    }

    fn cayalti_ledger() -> Ledger<InMemoryStockStore> {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap().with_seed(42);
        ledger
            .register(new_product("110016549", "Cayalti Gris", 20, "35.50"))
            .unwrap();
        ledger
    }

    /// Store whose writes can be switched off.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: InMemoryStockStore,
        down: bool,
    }

    impl StockStore for FlakyStore {
        fn load_all(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
            self.inner.load_all()
        }

        fn insert(&mut self, record: &ProductRecord) -> Result<(), StoreError> {
            if self.down {
                return Err(StoreError::Unavailable("sheet offline".to_string()));
            }
            self.inner.insert(record)
        }

        fn update_stock(&mut self, id: &ProductCode, quantity: i64) -> Result<(), StoreError> {
            if self.down {
                return Err(StoreError::Unavailable("sheet offline".to_string()));
            }
            self.inner.update_stock(id, quantity)
        }
    }

    #[derive(Debug, Default)]
    struct RecordingImages {
        stored: Vec<String>,
        discarded: Vec<ImageRef>,
    }

    impl ImageStore for RecordingImages {
        fn store(&mut self, file_name: &str, _bytes: &[u8]) -> Result<ImageRef, ImageError> {
            self.stored.push(file_name.to_string());
            Ok(ImageRef::new(format!("imagenes/{file_name}")))
        }

        fn discard(&mut self, image: &ImageRef) -> Result<(), ImageError> {
            self.discarded.push(image.clone());
            Ok(())
        }
    }

    #[test]
    fn adjust_stock_worked_example() {
        let mut ledger = cayalti_ledger();

        assert_eq!(ledger.adjust_stock("110016549", -5).unwrap(), 15);

        let err = ledger.adjust_stock("110016549", -30).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Domain(DomainError::insufficient_stock("110016549", 15, -30))
        );
        assert_eq!(ledger.find_by_identifier("110016549").unwrap().stock, 15);
        assert_eq!(ledger.store().rows()[0].stock, 15);
    }

    #[test]
    fn adjust_stock_receiving_and_zero_delta() {
        let mut ledger = cayalti_ledger();
        assert_eq!(ledger.adjust_stock(" 110016549 ", 12).unwrap(), 32);
        assert_eq!(ledger.adjust_stock("110016549", 0).unwrap(), 32);
        assert_eq!(ledger.adjust_stock("110016549", -32).unwrap(), 0);
    }

    #[test]
    fn adjust_stock_unknown_identifier_is_not_found() {
        let mut ledger = cayalti_ledger();
        let err = ledger.adjust_stock("999", 1).unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::not_found("999")));
    }

    #[test]
    fn adjust_stock_overflow_is_invalid_input() {
        let mut ledger = cayalti_ledger();
        let err = ledger.adjust_stock("110016549", i64::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::InvalidInput(_))));
        assert_eq!(ledger.find_by_identifier("110016549").unwrap().stock, 20);
    }

    #[test]
    fn register_then_find_returns_equal_record() {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
        let registered = ledger
            .register(new_product("110016549", "Cayalti Gris", 20, "35.50"))
            .unwrap()
            .clone();

        let found = ledger.find_by_identifier("110016549").unwrap();
        assert_eq!(found, &registered);
        assert_eq!(found.name, "Cayalti Gris");
        assert_eq!(found.price, Price::parse("35.5").unwrap());
    }

    #[test]
    fn register_duplicate_is_rejected_without_state_change() {
        let mut ledger = cayalti_ledger();
        let before = ledger.records().to_vec();

        let err = ledger
            .register(new_product("110016549", "Otro nombre", 1, "1"))
            .unwrap_err();

        assert_eq!(err.domain(), Some(&DomainError::duplicate("110016549")));
        assert_eq!(ledger.records(), before.as_slice());
        assert_eq!(ledger.store().rows(), before.as_slice());
    }

    #[test]
    fn register_without_identifier_generates_fallback_code() {
        let mut ledger = cayalti_ledger();
        let id = ledger
            .register(new_product("", "Pegamento X", 40, "18.90"))
            .unwrap()
            .id
            .clone();

        assert!(is_fallback_code(id.as_str()), "unexpected generated id {id}");
        assert_eq!(ledger.find_by_identifier(id.as_str()).unwrap().name, "Pegamento X");
    }

    #[test]
    fn generated_codes_are_distinct() {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap().with_seed(1);
        for i in 0..200 {
            ledger
                .register(new_product("", &format!("Fragua {i}"), 1, "2"))
                .unwrap();
        }
        assert_eq!(ledger.len(), 200);
        let mut ids: Vec<_> = ledger.records().iter().map(|r| r.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn register_rejects_blank_name_and_negative_stock() {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
        assert!(matches!(
            ledger.register(new_product("1", "  ", 1, "1")),
            Err(LedgerError::Domain(DomainError::InvalidInput(_)))
        ));
        assert!(matches!(
            ledger.register(new_product("1", "Grifo", -1, "1")),
            Err(LedgerError::Domain(DomainError::InvalidInput(_)))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let mut ledger = cayalti_ledger();
        let mut trebol = new_product("T-77", "Inodoro One Piece", 4, "420");
        trebol.brand = "Trebol".to_string();
        trebol.category = Category::Sanitary;
        trebol.grade = Grade::Standard;
        ledger.register(trebol).unwrap();

        let ids = |q: &str| -> Vec<String> {
            ledger.search(q).iter().map(|r| r.id.to_string()).collect()
        };

        assert_eq!(ids("GRIS"), vec!["110016549"]);
        assert_eq!(ids("trebol"), vec!["T-77"]);
        assert_eq!(ids("sanitario"), vec!["T-77"]);
        assert_eq!(ids("comercial"), vec!["110016549"]);
        assert_eq!(ids("35.5"), vec!["110016549"]);
        assert_eq!(ids("0016"), vec!["110016549"]);
        assert!(ids("porcelanato azul").is_empty());
    }

    #[test]
    fn empty_search_returns_everything_in_insertion_order() {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
        for id in ["c", "a", "b"] {
            ledger.register(new_product(id, "x", 1, "1")).unwrap();
        }
        let ids: Vec<_> = ledger.search("").iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(ledger.search("   ").len(), 3);
    }

    #[test]
    fn backend_failure_leaves_ledger_unchanged() {
        let mut ledger = Ledger::open(FlakyStore::default()).unwrap();
        ledger
            .register(new_product("110016549", "Cayalti Gris", 20, "35.50"))
            .unwrap();
        ledger.store.down = true;

        let err = ledger.adjust_stock("110016549", -5).unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Unavailable(_))));
        assert_eq!(ledger.find_by_identifier("110016549").unwrap().stock, 20);

        let err = ledger.register(new_product("2", "Fragua", 1, "1")).unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
        assert!(ledger.find_by_identifier("2").is_err());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn open_rejects_corrupt_backends() {
        let record = cayalti_ledger().records()[0].clone();

        let duplicated = InMemoryStockStore::with_records(vec![record.clone(), record.clone()]);
        assert!(matches!(
            Ledger::open(duplicated),
            Err(LedgerError::Store(StoreError::Corrupt(_)))
        ));

        let mut negative = record;
        negative.stock = -1;
        assert!(matches!(
            Ledger::open(InMemoryStockStore::with_records(vec![negative])),
            Err(LedgerError::Store(StoreError::Corrupt(_)))
        ));
    }

    #[test]
    fn reload_picks_up_backend_changes() {
        let mut ledger = cayalti_ledger();
        let external = ProductRecord {
            id: ProductCode::parse("EXT-1").unwrap(),
            ..ledger.records()[0].clone()
        };
        ledger.store.insert(&external).unwrap();
        assert_eq!(ledger.len(), 1);
        ledger.reload().unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.find_by_identifier("EXT-1").is_ok());
    }

    #[test]
    fn register_with_image_stores_reference_verbatim() {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
        let mut images = RecordingImages::default();

        let record = ledger
            .register_with_image(
                new_product("110016549", "Cayalti Gris", 20, "35.50"),
                Some(ImageUpload::new("cayalti.jpg", vec![0xff, 0xd8])),
                &mut images,
            )
            .unwrap();
        assert_eq!(record.image, Some(ImageRef::new("imagenes/cayalti.jpg")));

        let err = ledger
            .register_with_image(
                new_product("110016549", "Cayalti Gris", 20, "35.50"),
                Some(ImageUpload::new("again.jpg", vec![1])),
                &mut images,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::DuplicateIdentifier(_))));
        assert_eq!(images.stored, vec!["cayalti.jpg"]);
        assert!(images.discarded.is_empty());
    }

    #[test]
    fn failed_insert_discards_the_stored_image() {
        let mut ledger = Ledger::open(FlakyStore::default()).unwrap();
        ledger.store.down = true;
        let mut images = RecordingImages::default();

        let err = ledger
            .register_with_image(
                new_product("110016549", "Cayalti Gris", 20, "35.50"),
                Some(ImageUpload::new("cayalti.jpg", vec![0xff, 0xd8])),
                &mut images,
            )
            .unwrap_err();

        assert!(matches!(err, LedgerError::Store(StoreError::Unavailable(_))));
        assert_eq!(images.discarded, vec![ImageRef::new("imagenes/cayalti.jpg")]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn stock_is_capped_at_the_ceiling() {
        let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
        assert!(matches!(
            ledger.register(new_product("1", "Grifo", MAX_STOCK + 1, "1")),
            Err(LedgerError::Domain(DomainError::InvalidInput(_)))
        ));

        ledger.register(new_product("1", "Grifo", MAX_STOCK, "1")).unwrap();
        let err = ledger.adjust_stock("1", 1).unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::InvalidInput(_))));
        assert_eq!(ledger.find_by_identifier("1").unwrap().stock, MAX_STOCK);
        assert_eq!(ledger.store().rows()[0].stock, MAX_STOCK);
    }

    #[test]
    fn reload_rejects_out_of_range_stock_and_keeps_table() {
        let mut ledger = cayalti_ledger();
        let mut external = ProductRecord {
            id: ProductCode::parse("EXT-1").unwrap(),
            ..ledger.records()[0].clone()
        };
        external.stock = MAX_STOCK + 1;
        ledger.store.insert(&external).unwrap();

        assert!(matches!(
            ledger.reload(),
            Err(LedgerError::Store(StoreError::Corrupt(_)))
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: a successful adjustment stores exactly `quantity + delta`.
            #[test]
            fn non_negative_results_are_applied(
                stock in 0i64..100_000,
                delta in -100_000i64..100_000,
            ) {
                prop_assume!(stock + delta >= 0);
                let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
                ledger.register(new_product("SKU", "Mayólica", stock, "10")).unwrap();

                prop_assert_eq!(ledger.adjust_stock("SKU", delta).unwrap(), stock + delta);
                prop_assert_eq!(ledger.find_by_identifier("SKU").unwrap().stock, stock + delta);
                prop_assert_eq!(ledger.store().rows()[0].stock, stock + delta);
            }

            /// Property: an adjustment that would go negative is refused and changes nothing.
            #[test]
            fn negative_results_are_refused(
                stock in 0i64..100_000,
                excess in 1i64..100_000,
            ) {
                let delta = -(stock + excess);
                let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
                ledger.register(new_product("SKU", "Mayólica", stock, "10")).unwrap();

                let err = ledger.adjust_stock("SKU", delta).unwrap_err();
                prop_assert!(
                    matches!(err, LedgerError::Domain(DomainError::InsufficientStock { .. })),
                    "unexpected error {:?}",
                    err
                );
                prop_assert_eq!(ledger.find_by_identifier("SKU").unwrap().stock, stock);
                prop_assert_eq!(ledger.store().rows()[0].stock, stock);
            }

            /// Property: any fresh registration is retrievable unchanged.
            #[test]
            fn fresh_registrations_round_trip(
                id in "[A-Z0-9]{1,12}",
                name in "[A-Za-z][A-Za-z0-9 ]{0,40}",
                stock in 0i64..1_000_000,
                cents in 0u32..10_000_000,
            ) {
                let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
                let mut new = new_product(&id, &name, stock, "0");
                new.price = Price::new(rust_decimal::Decimal::new(cents.into(), 2)).unwrap();

                let registered = ledger.register(new.clone()).unwrap().clone();
                let found = ledger.find_by_identifier(&id).unwrap();
                prop_assert_eq!(found, &registered);
                prop_assert_eq!(&found.name, name.trim());
                prop_assert_eq!(found.stock, stock);
                prop_assert_eq!(found.price, new.price);
            }

            /// Property: a query matching nothing returns nothing.
            #[test]
            fn unmatched_query_is_empty(names in proptest::collection::vec("[a-z]{1,10}", 0..10)) {
                let mut ledger = Ledger::open(InMemoryStockStore::new()).unwrap();
                for (i, name) in names.iter().enumerate() {
                    ledger.register(new_product(&format!("S{i}"), name, 1, "1")).unwrap();
                }
                prop_assert!(ledger.search("#no-such-field#").is_empty());
                prop_assert_eq!(ledger.search("").len(), names.len());
            }
        }
    }
}
