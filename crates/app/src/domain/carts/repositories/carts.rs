//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::carts::models::{Address, Cart, CartUuid};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const SET_CART_ADDRESSES_SQL: &str = include_str!("../sql/set_cart_addresses.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        owner: Uuid,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(CREATE_CART_SQL)
            .bind(cart.into_uuid())
            .bind(owner)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        email: &str,
        shipping: &Address,
        billing: &Address,
    ) -> Result<Cart, sqlx::Error> {
        query_as::<Postgres, Cart>(SET_CART_ADDRESSES_SQL)
            .bind(cart.into_uuid())
            .bind(email)
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
            .fetch_one(&mut **tx)
            .await
    }
}

/// Read an optional address from `<prefix>_*` columns. Returns `None`
/// when the draft has not been filled in yet (name column NULL).
pub(crate) fn try_get_address(row: &PgRow, prefix: &str) -> Result<Option<Address>, sqlx::Error> {
    let name: Option<String> = row.try_get(format!("{prefix}_name").as_str())?;

    let Some(name) = name else {
        return Ok(None);
    };

    Ok(Some(Address {
        name,
        line1: row.try_get(format!("{prefix}_line1").as_str())?,
        line2: row.try_get(format!("{prefix}_line2").as_str())?,
        city: row.try_get(format!("{prefix}_city").as_str())?,
        state: row.try_get(format!("{prefix}_state").as_str())?,
        zip: row.try_get(format!("{prefix}_zip").as_str())?,
        country: row.try_get(format!("{prefix}_country").as_str())?,
        phone: row.try_get(format!("{prefix}_phone").as_str())?,
    }))
}

impl<'r> FromRow<'r, PgRow> for Cart {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let cart_items_count: i64 = row.try_get("cart_items_count")?;
        let capacity = usize::try_from(cart_items_count).unwrap_or_default();

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            owner_uuid: row.try_get("owner_uuid")?,
            contact_email: row.try_get("contact_email")?,
            shipping_address: try_get_address(row, "shipping")?,
            billing_address: try_get_address(row, "billing")?,
            items: Vec::with_capacity(capacity),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
