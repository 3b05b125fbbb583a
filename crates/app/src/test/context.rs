//! Test context for service-level integration tests.

use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        carts::{
            models::{Cart, CartUuid},
            service::{CartsService, PgCartsService},
        },
        catalog::{
            errors::CatalogServiceError,
            models::{NewProduct, Product, ProductUuid},
            service::{CatalogService, PgCatalogService},
        },
        coupons::service::PgCouponsService,
        projects::{
            errors::ProjectsServiceError,
            models::{NewProject, PackType, Project, ProjectUuid},
            service::{PgProjectsService, ProjectsService},
        },
        selections::service::PgSelectionsService,
    },
};

use super::db::TestDb;

/// Per-test database plus every service wired against it. Dropping
/// the context tears the database down.
pub struct TestContext {
    pub db: Db,
    pub projects: PgProjectsService,
    pub catalog: PgCatalogService,
    pub selections: PgSelectionsService,
    pub carts: PgCartsService,
    pub coupons: PgCouponsService,

    // Held for its Drop impl.
    #[allow(dead_code)]
    test_db: TestDb,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            projects: PgProjectsService::new(db.clone()),
            catalog: PgCatalogService::new(db.clone()),
            selections: PgSelectionsService::new(db.clone()),
            carts: PgCartsService::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            db,
            test_db,
        }
    }

    /// A project with the given allocation, owned by a fresh user.
    pub async fn create_project(
        &self,
        uuid: ProjectUuid,
        points: u64,
    ) -> Result<Project, ProjectsServiceError> {
        self.create_project_for(uuid, Uuid::now_v7(), points).await
    }

    pub async fn create_project_for(
        &self,
        uuid: ProjectUuid,
        owner: Uuid,
        points: u64,
    ) -> Result<Project, ProjectsServiceError> {
        self.projects
            .create_project(NewProject {
                uuid,
                owner_uuid: owner,
                name: "Test Project".to_string(),
                pack_type: PackType::Start,
                points,
            })
            .await
    }

    /// A skincare product where cost and retail price coincide.
    pub async fn create_named_product(
        &self,
        name: &str,
        srp: u64,
    ) -> Result<Product, CatalogServiceError> {
        self.catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: name.to_string(),
                category: "skincare".to_string(),
                from_price: srp,
                srp,
                image_url: None,
            })
            .await
    }

    /// Same as [`Self::create_named_product`] with a wholesale cost
    /// below retail, for margin-sensitive tests.
    pub async fn create_priced_product(
        &self,
        name: &str,
        srp: u64,
    ) -> Result<Product, CatalogServiceError> {
        self.catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: name.to_string(),
                category: "skincare".to_string(),
                from_price: srp / 2,
                srp,
                image_url: None,
            })
            .await
    }

    /// An empty cart for a fresh owner.
    pub async fn create_cart(&self) -> Result<Cart, crate::domain::carts::errors::CartsServiceError> {
        self.carts.create_cart(CartUuid::new(), Uuid::now_v7()).await
    }
}
