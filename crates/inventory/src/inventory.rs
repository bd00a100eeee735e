use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use stockroom_core::{DomainError, Entity};
use tempfile::NamedTempFile;

use crate::error::InventoryError;
use crate::product::{Product, parse_price, parse_stock};
use crate::record::ProductRecord;

/// Lifecycle of an [`Inventory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, file not read yet.
    Unloaded,
    /// `load` succeeded at least once.
    Loaded,
}

/// Outcome of [`Inventory::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// Outcome of [`Inventory::modify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOutcome {
    Modified,
    NotFound,
}

/// Outcome of [`Inventory::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Field changes for [`Inventory::modify`].
///
/// `None` and empty strings leave the field untouched. Price and stock are
/// coerced from text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductUpdate<'a> {
    pub name: Option<&'a str>,
    pub price: Option<&'a str>,
    pub stock: Option<&'a str>,
}

/// A product left out of [`Valuation::total`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub code: String,
    pub reason: String,
}

/// Result of [`Inventory::total_value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Valuation {
    pub total: f64,
    pub skipped: Vec<SkippedItem>,
}

/// Ordered product collection bound to one JSON file.
///
/// Insertion order is preserved; product codes are unique.
#[derive(Debug)]
pub struct Inventory {
    path: PathBuf,
    products: Vec<Product>,
    state: LifecycleState,
    dirty: bool,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Inventory {
    /// Bind an empty, unloaded inventory to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            products: Vec::new(),
            state: LifecycleState::Unloaded,
            dirty: false,
        }
    }

    /// Bind to `path` and load it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, InventoryError> {
        let mut inventory = Self::new(path);
        inventory.load()?;
        Ok(inventory)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the collection changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Read the bound file, replacing the current collection.
    ///
    /// A missing file is not an error: the collection is left as is and the
    /// inventory counts as loaded. Returns the number of products read.
    pub fn load(&mut self) -> Result<usize, InventoryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "inventory file not found, starting empty");
                self.state = LifecycleState::Loaded;
                return Ok(0);
            }
            Err(source) => {
                return Err(InventoryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let records: Vec<ProductRecord> =
            serde_json::from_str(&contents).map_err(|source| InventoryError::MalformedData {
                path: self.path.clone(),
                source,
            })?;

        let mut products = Vec::with_capacity(records.len());
        let mut seen = HashSet::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let invalid = |source| InventoryError::InvalidRecord {
                path: self.path.clone(),
                index,
                source,
            };
            let product = record.into_product().map_err(invalid)?;
            if !seen.insert(product.code().to_string()) {
                return Err(invalid(DomainError::invariant(format!(
                    "duplicate code '{}'",
                    product.code()
                ))));
            }
            products.push(product);
        }

        tracing::info!(path = %self.path.display(), products = products.len(), "inventory loaded");

        let count = products.len();
        self.products = products;
        self.state = LifecycleState::Loaded;
        self.dirty = false;
        Ok(count)
    }

    /// Write every product, in order, as the full contents of the bound file.
    ///
    /// The file is written to a sibling temporary file and renamed into place.
    pub fn save(&mut self) -> Result<(), InventoryError> {
        if self.state == LifecycleState::Unloaded {
            return Err(InventoryError::NotLoaded);
        }

        let records: Vec<ProductRecord> = self.products.iter().map(ProductRecord::from).collect();

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records
            .serialize(&mut ser)
            .map_err(|source| InventoryError::Io {
                path: self.path.clone(),
                source: std::io::Error::other(source),
            })?;

        let io_err = |source| InventoryError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&buf).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::info!(path = %self.path.display(), products = self.products.len(), "inventory saved");
        self.dirty = false;
        Ok(())
    }

    /// Append `product` unless its code is already present.
    pub fn add(&mut self, product: Product) -> AddOutcome {
        if self.find(product.code()).is_some() {
            tracing::debug!(code = product.code(), "product already exists");
            return AddOutcome::AlreadyExists;
        }
        self.products.push(product);
        self.dirty = true;
        AddOutcome::Added
    }

    /// All products in collection order.
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// First product whose code matches exactly.
    pub fn find(&self, code: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.has_key(code))
    }

    /// Live mutable reference to the product with `code`.
    ///
    /// Marks the inventory dirty when a product is found.
    pub fn find_mut(&mut self, code: &str) -> Option<&mut Product> {
        let product = self.products.iter_mut().find(|p| p.has_key(code))?;
        self.dirty = true;
        Some(product)
    }

    /// Overwrite the present fields of the product with `code`.
    ///
    /// All coercions happen before any field is written, so a validation error
    /// leaves the product untouched.
    pub fn modify(
        &mut self,
        code: &str,
        update: ProductUpdate<'_>,
    ) -> Result<ModifyOutcome, InventoryError> {
        if self.find(code).is_none() {
            return Ok(ModifyOutcome::NotFound);
        }

        let price = present(update.price).map(parse_price).transpose()?;
        let stock = present(update.stock).map(parse_stock).transpose()?;
        let name = present(update.name);

        let Some(product) = self.products.iter_mut().find(|p| p.has_key(code)) else {
            return Ok(ModifyOutcome::NotFound);
        };
        let changed = name.is_some() || price.is_some() || stock.is_some();
        if let Some(name) = name {
            product.rename(name);
        }
        if let Some(price) = price {
            product.set_price(price)?;
        }
        if let Some(stock) = stock {
            product.set_stock(stock);
        }

        if changed {
            self.dirty = true;
            tracing::debug!(code, "product modified");
        }
        Ok(ModifyOutcome::Modified)
    }

    /// Drop every product with `code`, keeping the relative order of the rest.
    pub fn remove(&mut self, code: &str) -> RemoveOutcome {
        let before = self.products.len();
        self.products.retain(|p| !p.has_key(code));
        if self.products.len() == before {
            return RemoveOutcome::NotFound;
        }
        self.dirty = true;
        RemoveOutcome::Removed
    }

    /// Sum of `price * stock`. Products with unparsed fields contribute
    /// nothing and are listed in [`Valuation::skipped`].
    pub fn total_value(&self) -> Valuation {
        let mut valuation = Valuation::default();
        for product in &self.products {
            match product.line_value() {
                Some(value) => valuation.total += value,
                None => {
                    let reason = format!(
                        "non-numeric price '{}' or stock '{}'",
                        product.price(),
                        product.stock()
                    );
                    tracing::warn!(code = product.code(), %reason, "skipping product in valuation");
                    valuation.skipped.push(SkippedItem {
                        code: product.code().to_string(),
                        reason,
                    });
                }
            }
        }
        valuation
    }

    /// Products whose supplier name equals `name`, ignoring case.
    pub fn by_provider(&self, name: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.supplier().is_named(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Numeric;
    use crate::supplier::Supplier;

    fn loaded() -> Inventory {
        let mut inventory = Inventory::new("unused.json");
        inventory.state = LifecycleState::Loaded;
        inventory
    }

    fn product(code: &str, price: f64, stock: u32, supplier: &str) -> Product {
        Product::new(code, format!("item {code}"), price, stock, Supplier::new(supplier, "c@x.com"))
            .unwrap()
    }

    fn widget() -> Product {
        Product::new("A1", "Widget", 9.99, 3, Supplier::new("Acme", "a@x.com")).unwrap()
    }

    #[test]
    fn empty_inventory_is_worth_nothing() {
        let valuation = loaded().total_value();
        assert_eq!(valuation.total, 0.0);
        assert!(valuation.skipped.is_empty());
    }

    #[test]
    fn total_value_multiplies_price_by_stock() {
        let mut inventory = loaded();
        inventory.add(widget());
        let valuation = inventory.total_value();
        assert!((valuation.total - 29.97).abs() < 1e-9);
    }

    #[test]
    fn adding_a_duplicate_code_is_reported_and_ignored() {
        let mut inventory = loaded();
        assert_eq!(inventory.add(widget()), AddOutcome::Added);
        assert_eq!(inventory.add(product("A1", 1.0, 1, "Other")), AddOutcome::AlreadyExists);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.find("A1").unwrap().name(), "Widget");
    }

    #[test]
    fn find_is_case_sensitive() {
        let mut inventory = loaded();
        inventory.add(widget());
        assert!(inventory.find("A1").is_some());
        assert!(inventory.find("a1").is_none());
    }

    #[test]
    fn modify_stock_leaves_other_fields() {
        let mut inventory = loaded();
        inventory.add(widget());

        let outcome = inventory
            .modify("A1", ProductUpdate { stock: Some("10"), ..Default::default() })
            .unwrap();

        assert_eq!(outcome, ModifyOutcome::Modified);
        let found = inventory.find("A1").unwrap();
        assert_eq!(found.stock(), &Numeric::Value(10));
        assert_eq!(found.name(), "Widget");
        assert_eq!(found.price(), &Numeric::Value(9.99));
    }

    #[test]
    fn modify_ignores_empty_strings() {
        let mut inventory = loaded();
        inventory.add(widget());

        let update = ProductUpdate {
            name: Some(""),
            price: Some(""),
            stock: Some(""),
        };
        assert_eq!(inventory.modify("A1", update).unwrap(), ModifyOutcome::Modified);
        assert_eq!(inventory.find("A1"), Some(&widget()));
    }

    #[test]
    fn modify_unknown_code_reports_not_found() {
        let mut inventory = loaded();
        let outcome = inventory
            .modify("ZZ", ProductUpdate { name: Some("x"), ..Default::default() })
            .unwrap();
        assert_eq!(outcome, ModifyOutcome::NotFound);
        assert!(!inventory.is_dirty());
    }

    #[test]
    fn modify_with_bad_number_changes_nothing() {
        let mut inventory = loaded();
        inventory.add(widget());

        let update = ProductUpdate {
            name: Some("Renamed"),
            price: Some("1.5"),
            stock: Some("ten"),
        };
        let err = inventory.modify("A1", update).unwrap_err();

        assert!(matches!(err, InventoryError::Validation(DomainError::Validation(_))));
        assert_eq!(inventory.find("A1"), Some(&widget()));
    }

    #[test]
    fn find_mut_edits_the_live_product() {
        let mut inventory = loaded();
        inventory.add(widget());
        inventory.find_mut("A1").unwrap().rename("Sprocket");
        assert_eq!(inventory.find("A1").unwrap().name(), "Sprocket");
    }

    #[test]
    fn remove_then_find_is_absent() {
        let mut inventory = loaded();
        inventory.add(widget());
        assert_eq!(inventory.remove("A1"), RemoveOutcome::Removed);
        assert!(inventory.find("A1").is_none());
        assert_eq!(inventory.remove("A1"), RemoveOutcome::NotFound);
    }

    #[test]
    fn remove_preserves_order_of_survivors() {
        let mut inventory = loaded();
        for code in ["A", "B", "C", "D"] {
            inventory.add(product(code, 1.0, 1, "Acme"));
        }
        inventory.remove("B");
        let codes: Vec<&str> = inventory.list().iter().map(Product::code).collect();
        assert_eq!(codes, ["A", "C", "D"]);
    }

    #[test]
    fn total_value_skips_unparsed_items() {
        let mut inventory = loaded();
        inventory.add(product("A", 2.0, 5, "Acme"));
        inventory.products.push(Product::from_parts(
            "B".to_string(),
            "Broken".to_string(),
            Numeric::Unparsed("abc".to_string()),
            Numeric::Value(3),
            Supplier::new("Acme", ""),
        ));
        inventory.add(product("C", 1.5, 2, "Acme"));

        let valuation = inventory.total_value();
        assert_eq!(valuation.total, 13.0);
        assert_eq!(valuation.skipped.len(), 1);
        assert_eq!(valuation.skipped[0].code, "B");
    }

    #[test]
    fn by_provider_ignores_case_and_keeps_order() {
        let mut inventory = loaded();
        inventory.add(product("A", 1.0, 1, "Acme"));
        inventory.add(product("B", 1.0, 1, "Globex"));
        inventory.add(product("C", 1.0, 1, "ACME"));

        let codes: Vec<&str> = inventory.by_provider("acme").iter().map(|p| p.code()).collect();
        assert_eq!(codes, ["A", "C"]);
        assert!(inventory.by_provider("Initech").is_empty());
    }

    #[test]
    fn save_before_load_is_refused() {
        let mut inventory = Inventory::new("never-written.json");
        assert!(matches!(inventory.save(), Err(InventoryError::NotLoaded)));
    }

    #[test]
    fn mutations_mark_dirty() {
        let mut inventory = loaded();
        assert!(!inventory.is_dirty());
        inventory.add(widget());
        assert!(inventory.is_dirty());

        inventory.dirty = false;
        inventory.add(widget());
        assert!(!inventory.is_dirty(), "duplicate add changes nothing");

        inventory
            .modify("A1", ProductUpdate { stock: Some("7"), ..Default::default() })
            .unwrap();
        assert!(inventory.is_dirty());

        inventory.dirty = false;
        assert_eq!(inventory.remove("ZZ"), RemoveOutcome::NotFound);
        assert!(!inventory.is_dirty());
        assert_eq!(inventory.remove("A1"), RemoveOutcome::Removed);
        assert!(inventory.is_dirty());
    }

    #[test]
    fn empty_update_leaves_inventory_clean() {
        let mut inventory = loaded();
        inventory.add(widget());
        inventory.dirty = false;

        let update = ProductUpdate {
            name: Some(""),
            price: None,
            stock: Some(""),
        };
        assert_eq!(inventory.modify("A1", update).unwrap(), ModifyOutcome::Modified);
        assert!(!inventory.is_dirty());
    }

    #[test]
    fn failed_update_leaves_inventory_clean() {
        let mut inventory = loaded();
        inventory.add(widget());
        inventory.dirty = false;

        let update = ProductUpdate { price: Some("gratis"), ..Default::default() };
        assert!(inventory.modify("A1", update).is_err());
        assert!(!inventory.is_dirty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn codes() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[A-D][0-3]", 0..40)
        }

        proptest! {
            /// Property: no two products share a code, whatever is added.
            #[test]
            fn codes_stay_unique(codes in codes()) {
                let mut inventory = loaded();
                for code in &codes {
                    let before = inventory.len();
                    match inventory.add(product(code, 1.0, 1, "Acme")) {
                        AddOutcome::Added => prop_assert_eq!(inventory.len(), before + 1),
                        AddOutcome::AlreadyExists => prop_assert_eq!(inventory.len(), before),
                    }
                }
                let unique: HashSet<&str> = inventory.list().iter().map(Product::code).collect();
                prop_assert_eq!(unique.len(), inventory.len());
            }

            /// Property: removing an absent code leaves the collection identical.
            #[test]
            fn removing_absent_code_is_identity(codes in codes(), missing in "[E-Z][0-9]") {
                let mut inventory = loaded();
                for code in &codes {
                    inventory.add(product(code, 1.0, 1, "Acme"));
                }
                let before = inventory.list().to_vec();
                prop_assert_eq!(inventory.remove(&missing), RemoveOutcome::NotFound);
                prop_assert_eq!(inventory.list(), before.as_slice());
            }

            /// Property: supplier filtering does not depend on the query's case.
            #[test]
            fn filter_is_case_insensitive(
                suppliers in prop::collection::vec("(Acme|acme|ACME|Globex)", 0..20),
                query in "(acme|ACME|Acme|aCmE)"
            ) {
                let mut inventory = loaded();
                for (i, supplier) in suppliers.iter().enumerate() {
                    inventory.add(product(&format!("P{i}"), 1.0, 1, supplier));
                }
                let expected = inventory.by_provider("Acme");
                prop_assert_eq!(inventory.by_provider(&query), expected);
            }

            /// Property: the total is the sum of the per-product values.
            #[test]
            fn total_is_additive(
                items in prop::collection::vec((0u32..10_000, 0u32..1_000), 0..30)
            ) {
                let mut inventory = loaded();
                let mut expected = 0.0;
                for (i, (cents, stock)) in items.iter().enumerate() {
                    let price = f64::from(*cents) / 100.0;
                    expected += price * f64::from(*stock);
                    inventory.add(product(&format!("P{i}"), price, *stock, "Acme"));
                }
                let valuation = inventory.total_value();
                prop_assert!((valuation.total - expected).abs() < 1e-6);
                prop_assert!(valuation.skipped.is_empty());
            }
        }
    }
}
