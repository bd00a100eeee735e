use core::fmt;

use stockroom_core::{DomainError, DomainResult, Entity};

use crate::supplier::Supplier;

/// A numeric product field as it is currently known.
///
/// Values entered through the API are always coerced up front. Files written by
/// older tools may still carry text that does not parse; that text is kept
/// verbatim so it survives a save, and valuation skips it.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric<T> {
    Value(T),
    Unparsed(String),
}

impl<T: Copy> Numeric<T> {
    /// The coerced value, or `None` if the field holds unparsed text.
    pub fn value(&self) -> Option<T> {
        match self {
            Numeric::Value(v) => Some(*v),
            Numeric::Unparsed(_) => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Numeric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Value(v) => v.fmt(f),
            Numeric::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// Coerce user text into a unit price.
pub fn parse_price(raw: &str) -> DomainResult<f64> {
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| DomainError::validation(format!("price '{raw}' is not a number")))?;
    check_price(price)
}

/// Coerce user text into a stock count.
pub fn parse_stock(raw: &str) -> DomainResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        DomainError::validation(format!("stock '{raw}' is not a non-negative integer"))
    })
}

pub(crate) fn check_price(price: f64) -> DomainResult<f64> {
    if !price.is_finite() {
        return Err(DomainError::validation(format!("price {price} is not finite")));
    }
    if price < 0.0 {
        return Err(DomainError::validation(format!("price {price} cannot be negative")));
    }
    Ok(price)
}

pub(crate) fn check_code(code: &str) -> DomainResult<()> {
    if code.trim().is_empty() {
        return Err(DomainError::validation("code cannot be empty"));
    }
    Ok(())
}

/// Stock-keeping record: code, name, price, stock and the supplier it comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    code: String,
    name: String,
    price: Numeric<f64>,
    stock: Numeric<u32>,
    supplier: Supplier,
}

impl Product {
    /// Create a product from already-typed values.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        stock: u32,
        supplier: Supplier,
    ) -> DomainResult<Self> {
        let code = code.into();
        check_code(&code)?;
        let price = check_price(price)?;

        Ok(Self {
            code,
            name: name.into(),
            price: Numeric::Value(price),
            stock: Numeric::Value(stock),
            supplier,
        })
    }

    /// Create a product from raw text (interactive input), coercing price and
    /// stock eagerly.
    pub fn parse(
        code: &str,
        name: &str,
        price: &str,
        stock: &str,
        supplier: Supplier,
    ) -> DomainResult<Self> {
        Self::new(code, name, parse_price(price)?, parse_stock(stock)?, supplier)
    }

    /// Rebuild a product from persisted fields. The caller has already
    /// validated the code and any coerced price.
    pub(crate) fn from_parts(
        code: String,
        name: String,
        price: Numeric<f64>,
        stock: Numeric<u32>,
        supplier: Supplier,
    ) -> Self {
        Self {
            code,
            name,
            price,
            stock,
            supplier,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Numeric<f64> {
        &self.price
    }

    pub fn stock(&self) -> &Numeric<u32> {
        &self.stock
    }

    pub fn supplier(&self) -> &Supplier {
        &self.supplier
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_price(&mut self, price: f64) -> DomainResult<()> {
        self.price = Numeric::Value(check_price(price)?);
        Ok(())
    }

    pub fn set_stock(&mut self, stock: u32) {
        self.stock = Numeric::Value(stock);
    }

    /// `price * stock`, or `None` if either field is unparsed.
    pub fn line_value(&self) -> Option<f64> {
        let price = self.price.value()?;
        let stock = self.stock.value()?;
        Some(price * f64::from(stock))
    }
}

impl Entity for Product {
    type Key = str;

    fn key(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} ({}) | {} ({})",
            self.code,
            self.name,
            self.price,
            self.stock,
            self.supplier.name(),
            self.supplier.contact()
        )
    }
}
