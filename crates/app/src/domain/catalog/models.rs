//! Catalog Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product Model
///
/// Immutable catalog entity. `from_price` is the private-label cost,
/// `srp` the suggested retail price, both in minor currency units.
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub category: String,
    pub from_price: u64,
    pub srp: u64,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Product {
    /// Margin between the suggested retail price and the cost.
    /// Derived, never stored.
    #[must_use]
    pub fn profit(&self) -> u64 {
        self.srp.saturating_sub(self.from_price)
    }
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub category: String,
    pub from_price: u64,
    pub srp: u64,
    pub image_url: Option<String>,
}
