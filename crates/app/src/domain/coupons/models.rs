//! Coupon Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<Coupon>;

/// The two discount shapes a coupon can carry. Fixed amounts are in
/// minor units; percentages are whole numbers bounded to 100 at
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    Fixed(u64),
    Percentage(u64),
}

impl Discount {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Percentage(_) => "percentage",
        }
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        match self {
            Self::Fixed(value) | Self::Percentage(value) => *value,
        }
    }

    #[must_use]
    pub fn from_parts(kind: &str, value: u64) -> Option<Self> {
        match kind {
            "fixed" => Some(Self::Fixed(value)),
            "percentage" => Some(Self::Percentage(value)),
            _ => None,
        }
    }
}

/// Why a coupon could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidCouponReason {
    Inactive,
    NotYetValid,
    Expired,
}

/// Coupon Model
///
/// Codes are stored lowercase and matched case-insensitively. The
/// validity window has inclusive bounds; a missing bound is open.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: Discount,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Coupon {
    /// Amount off a subtotal at a given instant, in minor units. A
    /// fixed discount never exceeds the subtotal.
    pub fn discount_at(&self, subtotal: u64, now: Timestamp) -> Result<u64, InvalidCouponReason> {
        if !self.is_active {
            return Err(InvalidCouponReason::Inactive);
        }

        if self.valid_from.is_some_and(|from| now < from) {
            return Err(InvalidCouponReason::NotYetValid);
        }

        if self.valid_until.is_some_and(|until| now > until) {
            return Err(InvalidCouponReason::Expired);
        }

        let amount = match self.discount {
            Discount::Fixed(value) => value.min(subtotal),
            Discount::Percentage(value) => subtotal * value / 100,
        };

        Ok(amount)
    }
}
