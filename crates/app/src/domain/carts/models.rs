//! Cart Models

use jiff::Timestamp;
use uuid::Uuid;

use crate::{domain::catalog::models::ProductUuid, uuids::TypedUuid};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Shipping or billing address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: Option<String>,
}

impl Address {
    /// Check the zip field against the accepted formats (5 digits, or
    /// ZIP+4 with a hyphen).
    #[must_use]
    pub fn has_valid_zip(&self) -> bool {
        let mut parts = self.zip.splitn(2, '-');

        let Some(base) = parts.next() else {
            return false;
        };

        if base.len() != 5 || !base.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        match parts.next() {
            None => true,
            Some(plus4) => plus4.len() == 4 && plus4.chars().all(|c| c.is_ascii_digit()),
        }
    }
}

/// Cart Model
///
/// A server-side draft order: line items plus the shipping/billing
/// hand-off between the shipping and payment steps. Survives the
/// browser session.
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub owner_uuid: Uuid,
    pub contact_email: Option<String>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub items: Vec<CartItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// Sum of unit price × quantity over all lines, in minor units.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.items
            .iter()
            .map(|item| item.unit_price.saturating_mul(u64::from(item.quantity)))
            .sum()
    }

    /// Total number of physical units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// CartItem Model
///
/// `unit_price` snapshots the product's suggested retail price at the
/// moment the line was created.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
