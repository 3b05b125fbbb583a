//! Coupons Repository

use jiff_sqlx::{Timestamp as SqlxTimestamp, ToSqlx};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::coupons::models::{Coupon, CouponUuid, Discount},
};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const GET_COUPON_BY_CODE_SQL: &str = include_str!("sql/get_coupon_by_code.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const DEACTIVATE_COUPON_SQL: &str = include_str!("sql/deactivate_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
        code: &str,
        discount: Discount,
        valid_from: Option<jiff::Timestamp>,
        valid_until: Option<jiff::Timestamp>,
    ) -> Result<Coupon, sqlx::Error> {
        query_as::<Postgres, Coupon>(CREATE_COUPON_SQL)
            .bind(coupon.into_uuid())
            .bind(code)
            .bind(discount.kind())
            .bind(amount_to_i64(discount.value(), "discount_value")?)
            .bind(valid_from.map(ToSqlx::to_sqlx))
            .bind(valid_until.map(ToSqlx::to_sqlx))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Coupon, sqlx::Error> {
        query_as::<Postgres, Coupon>(GET_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Coupon>, sqlx::Error> {
        query_as::<Postgres, Coupon>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn deactivate_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Coupon, sqlx::Error> {
        query_as::<Postgres, Coupon>(DEACTIVATE_COUPON_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Coupon {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("discount_type")?;
        let value = try_get_amount(row, "discount_value")?;

        let discount =
            Discount::from_parts(&kind, value).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "discount_type".to_string(),
                source: format!("unknown discount type {kind:?}").into(),
            })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount,
            valid_from: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_from")?
                .map(SqlxTimestamp::to_jiff),
            valid_until: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_until")?
                .map(SqlxTimestamp::to_jiff),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
