//! Inventory domain module.
//!
//! Products, their suppliers, and the [`Inventory`] aggregate that keeps them
//! in order and persists them to a JSON file. This is the only crate that
//! touches the filesystem.

pub mod error;
pub mod inventory;
pub mod product;
pub mod record;
pub mod supplier;

pub use error::InventoryError;
pub use inventory::{
    AddOutcome, Inventory, LifecycleState, ModifyOutcome, ProductUpdate, RemoveOutcome,
    SkippedItem, Valuation,
};
pub use product::{Numeric, Product, parse_price, parse_stock};
pub use record::{ProductRecord, RawNumber, SupplierRecord};
pub use supplier::Supplier;
