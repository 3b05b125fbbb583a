//! Projects Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::projects::models::{PackType, Project, ProjectStatus, ProjectUuid},
};

const CREATE_PROJECT_SQL: &str = include_str!("sql/create_project.sql");
const GET_PROJECT_SQL: &str = include_str!("sql/get_project.sql");
const LIST_PROJECTS_SQL: &str = include_str!("sql/list_projects.sql");
const LIST_ELIGIBLE_PROJECTS_SQL: &str = include_str!("sql/list_eligible_projects.sql");
const ADJUST_POINTS_SQL: &str = include_str!("sql/adjust_points.sql");
const CONSUME_POINTS_SQL: &str = include_str!("sql/consume_points.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProjectsRepository;

impl PgProjectsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_project(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectUuid,
        owner: Uuid,
        name: &str,
        pack_type: PackType,
        points: u64,
    ) -> Result<Project, sqlx::Error> {
        query_as::<Postgres, Project>(CREATE_PROJECT_SQL)
            .bind(project.into_uuid())
            .bind(owner)
            .bind(name)
            .bind(pack_type.as_str())
            .bind(amount_to_i64(points, "points")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_project(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectUuid,
    ) -> Result<Project, sqlx::Error> {
        query_as::<Postgres, Project>(GET_PROJECT_SQL)
            .bind(project.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_projects(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: Uuid,
    ) -> Result<Vec<Project>, sqlx::Error> {
        query_as::<Postgres, Project>(LIST_PROJECTS_SQL)
            .bind(owner)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_eligible_projects(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: Uuid,
        cost: u64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        query_as::<Postgres, Project>(LIST_ELIGIBLE_PROJECTS_SQL)
            .bind(owner)
            .bind(amount_to_i64(cost, "points")?)
            .fetch_all(&mut **tx)
            .await
    }

    /// Apply deltas to the ledger fields. The WHERE clause refuses any
    /// result that would overspend or underflow, so a concurrent writer
    /// cannot slip past a stale read; zero rows means rejection.
    pub(crate) async fn adjust_points(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectUuid,
        allocated_delta: i64,
        consumed_delta: i64,
    ) -> Result<Option<Project>, sqlx::Error> {
        query_as::<Postgres, Project>(ADJUST_POINTS_SQL)
            .bind(project.into_uuid())
            .bind(allocated_delta)
            .bind(consumed_delta)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Spend `cost` points against an active project, guarded the same
    /// way as [`Self::adjust_points`]. `None` means the project could
    /// not afford the cost (or is not active).
    pub(crate) async fn consume_points(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        project: ProjectUuid,
        cost: u64,
    ) -> Result<Option<Project>, sqlx::Error> {
        query_as::<Postgres, Project>(CONSUME_POINTS_SQL)
            .bind(project.into_uuid())
            .bind(amount_to_i64(cost, "points_used")?)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Project {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let pack_type_str: String = row.try_get("pack_type")?;
        let pack_type =
            PackType::parse(&pack_type_str).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "pack_type".to_string(),
                source: format!("unknown pack type {pack_type_str:?}").into(),
            })?;

        let status_str: String = row.try_get("status")?;
        let status =
            ProjectStatus::parse(&status_str).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: format!("unknown project status {status_str:?}").into(),
            })?;

        Ok(Self {
            uuid: ProjectUuid::from_uuid(row.try_get("uuid")?),
            owner_uuid: row.try_get("owner_uuid")?,
            name: row.try_get("name")?,
            pack_type,
            status,
            points: try_get_amount(row, "points")?,
            points_used: try_get_amount(row, "points_used")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
