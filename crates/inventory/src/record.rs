//! On-disk record shape.
//!
//! Field names are the persisted contract and must not change.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult};

use crate::product::{Numeric, Product, check_code, check_price};
use crate::supplier::Supplier;

/// A numeric field as it appears in the file: a JSON number, or text written
/// by a tool that stored raw input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber<T> {
    Number(T),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "contacto")]
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: RawNumber<f64>,
    pub stock: RawNumber<u32>,
    #[serde(rename = "proveedor")]
    pub supplier: SupplierRecord,
}

impl ProductRecord {
    /// Convert to a domain product.
    ///
    /// Numeric text is coerced and checked like a JSON number; text that is not
    /// a number at all is kept as [`Numeric::Unparsed`]. A number that breaks
    /// the price or stock rules is an error either way.
    pub fn into_product(self) -> DomainResult<Product> {
        check_code(&self.code)?;

        let price = match self.price {
            RawNumber::Number(p) => Numeric::Value(check_price(p)?),
            RawNumber::Text(raw) => match raw.trim().parse::<f64>() {
                Ok(p) => Numeric::Value(check_price(p)?),
                Err(_) => Numeric::Unparsed(raw),
            },
        };
        let stock = match self.stock {
            RawNumber::Number(s) => Numeric::Value(s),
            RawNumber::Text(raw) => stock_from_text(raw)?,
        };

        Ok(Product::from_parts(
            self.code,
            self.name,
            price,
            stock,
            Supplier::new(self.supplier.name, self.supplier.contact),
        ))
    }
}

fn stock_from_text(raw: String) -> DomainResult<Numeric<u32>> {
    let trimmed = raw.trim();
    if let Ok(stock) = trimmed.parse::<u32>() {
        return Ok(Numeric::Value(stock));
    }
    if trimmed.parse::<f64>().is_ok() {
        return Err(DomainError::validation(format!(
            "stock '{trimmed}' is not a non-negative integer"
        )));
    }
    Ok(Numeric::Unparsed(raw))
}

fn raw_number<T: Copy>(field: &Numeric<T>) -> RawNumber<T> {
    match field {
        Numeric::Value(v) => RawNumber::Number(*v),
        Numeric::Unparsed(raw) => RawNumber::Text(raw.clone()),
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            code: product.code().to_string(),
            name: product.name().to_string(),
            price: raw_number(product.price()),
            stock: raw_number(product.stock()),
            supplier: SupplierRecord {
                name: product.supplier().name().to_string(),
                contact: product.supplier().contact().to_string(),
            },
        }
    }
}
