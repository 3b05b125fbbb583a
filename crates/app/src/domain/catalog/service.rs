//! Catalog service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::catalog::{
        errors::CatalogServiceError,
        models::{NewProduct, Product, ProductUuid},
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn search_products(&self, term: String) -> Result<Vec<Product>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.search_products(&mut tx, &term).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<Product, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_product(&self, product: ProductUuid) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(CatalogServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieves all live catalog products.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogServiceError>;

    /// Case-insensitive substring match over name and category.
    /// Relevance ranking is a non-goal.
    async fn search_products(&self, term: String) -> Result<Vec<Product>, CatalogServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<Product, CatalogServiceError>;

    /// Creates a new catalog product.
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogServiceError>;

    /// Soft-deletes a product, removing it from listings.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn create_product_returns_prices() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = ProductUuid::new();

        let product = ctx
            .catalog
            .create_product(NewProduct {
                uuid,
                name: "Night Cream".to_string(),
                category: "skincare".to_string(),
                from_price: 7_00,
                srp: 19_00,
                image_url: None,
            })
            .await?;

        assert_eq!(product.uuid, uuid);
        assert_eq!(product.from_price, 7_00);
        assert_eq!(product.srp, 19_00);
        assert_eq!(product.profit(), 12_00);
        assert!(product.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn search_matches_name_substring_case_insensitively() -> TestResult {
        let ctx = TestContext::new().await;

        let serum = ctx.create_named_product("Vitamin C Serum", 10_00).await?;
        ctx.create_named_product("Lip Balm", 4_00).await?;

        let hits = ctx.catalog.search_products("serum".to_string()).await?;

        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().map(|p| p.uuid), Some(serum.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn search_matches_category() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.create_named_product("Vitamin C Serum", 10_00).await?;

        let hits = ctx.catalog.search_products("SKIN".to_string()).await?;

        assert_eq!(hits.len(), 1, "category substring should match");

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_not_listed_or_fetchable() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_named_product("Toner", 6_00).await?;

        ctx.catalog.delete_product(product.uuid).await?;

        let listed = ctx.catalog.list_products().await?;
        assert!(!listed.iter().any(|p| p.uuid == product.uuid));

        let result = ctx.catalog.get_product(product.uuid).await;
        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound after delete, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.delete_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
