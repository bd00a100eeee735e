use core::fmt;

/// Supplier attached to a product.
///
/// Plain value: compared by its fields, never shared between products even
/// when two products name the same supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    name: String,
    contact: String,
}

impl Supplier {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Case-insensitive match on the supplier name.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Contacto: {}", self.name, self.contact)
    }
}
