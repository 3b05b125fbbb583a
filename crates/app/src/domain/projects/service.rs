//! Projects service.

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::projects::{
        errors::ProjectsServiceError,
        models::{NewProject, PointsAdjustment, Project, ProjectUuid},
        repository::PgProjectsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProjectsService {
    db: Db,
    repository: PgProjectsRepository,
}

impl PgProjectsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProjectsRepository::new(),
        }
    }
}

#[async_trait]
impl ProjectsService for PgProjectsService {
    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_project(
                &mut tx,
                project.uuid,
                project.owner_uuid,
                &project.name,
                project.pack_type,
                project.points,
            )
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_project(&self, project: ProjectUuid) -> Result<Project, ProjectsServiceError> {
        let mut tx = self.db.begin().await?;

        let project = self.repository.get_project(&mut tx, project).await?;

        tx.commit().await?;

        Ok(project)
    }

    async fn list_projects(&self, owner: Uuid) -> Result<Vec<Project>, ProjectsServiceError> {
        let mut tx = self.db.begin().await?;

        let projects = self.repository.list_projects(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(projects)
    }

    async fn eligible_projects(
        &self,
        owner: Uuid,
        cost: u64,
    ) -> Result<Vec<Project>, ProjectsServiceError> {
        let mut tx = self.db.begin().await?;

        let projects = self
            .repository
            .list_eligible_projects(&mut tx, owner, cost)
            .await?;

        tx.commit().await?;

        Ok(projects)
    }

    async fn adjust_points(
        &self,
        project: ProjectUuid,
        adjustment: PointsAdjustment,
    ) -> Result<Project, ProjectsServiceError> {
        let mut tx = self.db.begin().await?;

        let adjusted = self
            .repository
            .adjust_points(
                &mut tx,
                project,
                adjustment.allocated_delta,
                adjustment.consumed_delta,
            )
            .await?;

        let Some(adjusted) = adjusted else {
            // Distinguish a missing project from a rejected adjustment.
            self.repository.get_project(&mut tx, project).await?;

            return Err(ProjectsServiceError::InvalidAdjustment);
        };

        tx.commit().await?;

        Ok(adjusted)
    }
}

#[automock]
#[async_trait]
pub trait ProjectsService: Send + Sync {
    /// Creates a project with its initial point allocation.
    async fn create_project(&self, project: NewProject) -> Result<Project, ProjectsServiceError>;

    /// Retrieve a single project.
    async fn get_project(&self, project: ProjectUuid) -> Result<Project, ProjectsServiceError>;

    /// Retrieves all projects belonging to an owner.
    async fn list_projects(&self, owner: Uuid) -> Result<Vec<Project>, ProjectsServiceError>;

    /// Active projects of an owner whose available balance covers `cost`.
    async fn eligible_projects(
        &self,
        owner: Uuid,
        cost: u64,
    ) -> Result<Vec<Project>, ProjectsServiceError>;

    /// Apply an admin point adjustment. Rejected with
    /// [`ProjectsServiceError::InvalidAdjustment`] when the result would
    /// violate `points_used <= points` or drive either field negative.
    async fn adjust_points(
        &self,
        project: ProjectUuid,
        adjustment: PointsAdjustment,
    ) -> Result<Project, ProjectsServiceError>;
}
