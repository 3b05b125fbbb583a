//! Order Models

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    domain::{carts::models::Address, catalog::models::ProductUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<SampleOrder>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Order lifecycle. Every transition is written by the orders service
/// with a guarded update; nothing else touches the status column.
///
/// `MirrorPending` is the durable state between payment capture and a
/// successful mirror to the commerce platform. An order never leaves
/// it silently: either a mirror attempt moves it to `Processing`, or
/// an operator cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    MirrorPending,
    Processing,
    Completed,
    Canceled,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::MirrorPending => "mirror_pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "mirror_pending" => Some(Self::MirrorPending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::MirrorPending | Self::Canceled)
                | (Self::MirrorPending, Self::Processing | Self::Canceled)
                | (Self::Processing, Self::Completed | Self::Canceled)
        )
    }
}

/// Sample Order Model
///
/// Written at checkout from the cart draft. Addresses and line prices
/// are snapshots; later catalog or cart edits never change an order.
#[derive(Debug, Clone)]
pub struct SampleOrder {
    pub uuid: OrderUuid,
    pub user_uuid: Uuid,
    pub status: OrderStatus,
    pub contact_email: String,
    pub contact_phone: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub subtotal: u64,
    pub discount: u64,
    pub shipping_cost: u64,
    pub total: u64,
    pub payment_intent_id: Option<String>,
    pub external_order_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One order line. Immutable after creation.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
}

/// Maps a catalog product to the commerce platform's variant id.
#[derive(Debug, Clone)]
pub struct VariantMapping {
    pub product_uuid: ProductUuid,
    pub external_variant_id: String,
}

/// Totals computed for a checkout, all in minor units.
#[derive(Debug, Clone, Copy)]
pub struct OrderTotals {
    pub subtotal: u64,
    pub discount: u64,
    pub shipping_cost: u64,
}

impl OrderTotals {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.subtotal
            .saturating_sub(self.discount)
            .saturating_add(self.shipping_cost)
    }
}
