//! Orders Repository
//!
//! Status writes are guarded updates: the expected current status is
//! part of the WHERE clause, and zero rows affected means the order
//! was not where the caller thought it was.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::{
        carts::{models::Address, repositories::try_get_address},
        catalog::models::ProductUuid,
        orders::models::{
            OrderItem, OrderItemUuid, OrderStatus, OrderTotals, OrderUuid, SampleOrder,
            VariantMapping,
        },
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const LIST_MIRROR_PENDING_SQL: &str = include_str!("sql/list_mirror_pending.sql");
const SET_ORDER_STATUS_SQL: &str = include_str!("sql/set_order_status.sql");
const SET_PAYMENT_INTENT_SQL: &str = include_str!("sql/set_payment_intent.sql");
const SET_EXTERNAL_ORDER_SQL: &str = include_str!("sql/set_external_order.sql");
const GET_VARIANT_MAPPING_SQL: &str = include_str!("sql/get_variant_mapping.sql");
const UPSERT_VARIANT_MAPPING_SQL: &str = include_str!("sql/upsert_variant_mapping.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        user: Uuid,
        email: &str,
        phone: &str,
        shipping: &Address,
        billing: &Address,
        totals: OrderTotals,
    ) -> Result<SampleOrder, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(CREATE_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user)
            .bind(email)
            .bind(phone)
            .bind(&shipping.name)
            .bind(&shipping.line1)
            .bind(&shipping.line2)
            .bind(&shipping.city)
            .bind(&shipping.state)
            .bind(&shipping.zip)
            .bind(&shipping.country)
            .bind(&shipping.phone)
            .bind(&billing.name)
            .bind(&billing.line1)
            .bind(&billing.line2)
            .bind(&billing.city)
            .bind(&billing.state)
            .bind(&billing.zip)
            .bind(&billing.country)
            .bind(&billing.phone)
            .bind(amount_to_i64(totals.subtotal, "subtotal")?)
            .bind(amount_to_i64(totals.discount, "discount")?)
            .bind(amount_to_i64(totals.shipping_cost, "shipping_cost")?)
            .bind(amount_to_i64(totals.total(), "total")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        product: ProductUuid,
        quantity: u32,
        unit_price: u64,
    ) -> Result<OrderItem, sqlx::Error> {
        query_as::<Postgres, OrderItem>(CREATE_ORDER_ITEM_SQL)
            .bind(OrderItemUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(product.into_uuid())
            .bind(i32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            })?)
            .bind(amount_to_i64(unit_price, "unit_price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<SampleOrder, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        query_as::<Postgres, OrderItem>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<SampleOrder>, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(LIST_ORDERS_SQL)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_mirror_pending(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<SampleOrder>, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(LIST_MIRROR_PENDING_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    /// Move an order from `expected` to `next`. `None` means the
    /// order was not in `expected` (or does not exist).
    pub(crate) async fn set_order_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<SampleOrder>, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(SET_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_payment_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        intent_id: &str,
    ) -> Result<SampleOrder, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(SET_PAYMENT_INTENT_SQL)
            .bind(order.into_uuid())
            .bind(intent_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Record the external order id and move MirrorPending to
    /// Processing in one statement. `None` means the order left
    /// MirrorPending in the meantime.
    pub(crate) async fn set_external_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        external_id: &str,
    ) -> Result<Option<SampleOrder>, sqlx::Error> {
        query_as::<Postgres, SampleOrder>(SET_EXTERNAL_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(external_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_variant_mapping(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<VariantMapping>, sqlx::Error> {
        query_as::<Postgres, VariantMapping>(GET_VARIANT_MAPPING_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_variant_mapping(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        external_variant_id: &str,
    ) -> Result<VariantMapping, sqlx::Error> {
        query_as::<Postgres, VariantMapping>(UPSERT_VARIANT_MAPPING_SQL)
            .bind(product.into_uuid())
            .bind(external_variant_id)
            .fetch_one(&mut **tx)
            .await
    }
}

fn require_address(row: &PgRow, prefix: &str) -> Result<Address, sqlx::Error> {
    try_get_address(row, prefix)?.ok_or_else(|| sqlx::Error::ColumnDecode {
        index: format!("{prefix}_name"),
        source: "order address snapshot is incomplete".into(),
    })
}

impl<'r> FromRow<'r, PgRow> for SampleOrder {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status_str: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_str).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown order status {status_str:?}").into(),
        })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: row.try_get("user_uuid")?,
            status,
            contact_email: row.try_get("contact_email")?,
            contact_phone: row.try_get("contact_phone")?,
            shipping_address: require_address(row, "shipping")?,
            billing_address: require_address(row, "billing")?,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            shipping_cost: try_get_amount(row, "shipping_cost")?,
            total: try_get_amount(row, "total")?,
            payment_intent_id: row.try_get("payment_intent_id")?,
            external_order_id: row.try_get("external_order_id")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i32: i32 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity,
            unit_price: try_get_amount(row, "unit_price")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VariantMapping {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            external_variant_id: row.try_get("external_variant_id")?,
        })
    }
}
