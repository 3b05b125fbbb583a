//! Selections Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::amount_to_i64,
    domain::{
        catalog::models::ProductUuid,
        projects::models::ProjectUuid,
        selections::models::{Selection, SelectionOverrides, SelectionUuid},
    },
};

const CREATE_SELECTION_SQL: &str = include_str!("sql/create_selection.sql");
const GET_SELECTION_SQL: &str = include_str!("sql/get_selection.sql");
const LIST_SELECTIONS_SQL: &str = include_str!("sql/list_selections.sql");
const UPDATE_SELECTION_OVERRIDES_SQL: &str = include_str!("sql/update_selection_overrides.sql");
const DELETE_SELECTION_SQL: &str = include_str!("sql/delete_selection.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSelectionsRepository;

impl PgSelectionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_selection(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        selection: SelectionUuid,
        project: ProjectUuid,
        product: ProductUuid,
        overrides: &SelectionOverrides,
    ) -> Result<Selection, sqlx::Error> {
        let custom_price = overrides
            .price
            .map(|price| amount_to_i64(price, "custom_price"))
            .transpose()?;

        query_as::<Postgres, Selection>(CREATE_SELECTION_SQL)
            .bind(selection.into_uuid())
            .bind(project.into_uuid())
            .bind(product.into_uuid())
            .bind(&overrides.name)
            .bind(custom_price)
            .bind(&overrides.image_url)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_selection(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        selection: SelectionUuid,
    ) -> Result<Selection, sqlx::Error> {
        query_as::<Postgres, Selection>(GET_SELECTION_SQL)
            .bind(selection.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_selections(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectUuid,
    ) -> Result<Vec<Selection>, sqlx::Error> {
        query_as::<Postgres, Selection>(LIST_SELECTIONS_SQL)
            .bind(project.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_overrides(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        selection: SelectionUuid,
        overrides: &SelectionOverrides,
    ) -> Result<Selection, sqlx::Error> {
        let custom_price = overrides
            .price
            .map(|price| amount_to_i64(price, "custom_price"))
            .transpose()?;

        query_as::<Postgres, Selection>(UPDATE_SELECTION_OVERRIDES_SQL)
            .bind(selection.into_uuid())
            .bind(&overrides.name)
            .bind(custom_price)
            .bind(&overrides.image_url)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_selection(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        selection: SelectionUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_SELECTION_SQL)
            .bind(selection.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Selection {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let custom_price = row
            .try_get::<Option<i64>, _>("custom_price")?
            .map(|price| {
                u64::try_from(price).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "custom_price".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()?;

        Ok(Self {
            uuid: SelectionUuid::from_uuid(row.try_get("uuid")?),
            project_uuid: ProjectUuid::from_uuid(row.try_get("project_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            custom_name: row.try_get("custom_name")?,
            custom_price,
            custom_image_url: row.try_get("custom_image_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
