//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Address, Cart, CartItem, CartItemUuid, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        catalog::{models::ProductUuid, repository::PgCatalogRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    catalog_repository: PgCatalogRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            catalog_repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, cart: CartUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.get_cart(&mut tx, cart).await?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        cart.items.extend(items);

        Ok(cart)
    }

    async fn create_cart(&self, cart: CartUuid, owner: Uuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.carts_repository.create_cart(&mut tx, cart, owner).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_cart(&self, cart: CartUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.carts_repository.delete_cart(&mut tx, cart).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn add_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<CartItem, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        // Existence check doubles as the price snapshot source.
        self.carts_repository.get_cart(&mut tx, cart).await?;

        let product_record = self
            .catalog_repository
            .get_product(&mut tx, product)
            .await
            .map_err(|error| {
                if matches!(error, sqlx::Error::RowNotFound) {
                    CartsServiceError::ProductNotFound
                } else {
                    error.into()
                }
            })?;

        let item = self
            .items_repository
            .upsert_cart_item(&mut tx, cart, product, product_record.srp)
            .await?;

        tx.commit().await?;

        Ok(item)
    }

    async fn update_quantity(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartItem, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .items_repository
            .update_quantity(&mut tx, cart, item, quantity.max(1))
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn set_addresses(
        &self,
        cart: CartUuid,
        email: String,
        shipping: Address,
        billing: Address,
    ) -> Result<Cart, CartsServiceError> {
        if !shipping.has_valid_zip() || !billing.has_valid_zip() {
            return Err(CartsServiceError::InvalidZipFormat);
        }

        let mut tx = self.db.begin().await?;

        let mut cart = self
            .carts_repository
            .set_addresses(&mut tx, cart, &email, &shipping, &billing)
            .await?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        cart.items.extend(items);

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve a single cart with its items.
    async fn get_cart(&self, cart: CartUuid) -> Result<Cart, CartsServiceError>;

    /// Creates an empty cart for an owner.
    async fn create_cart(&self, cart: CartUuid, owner: Uuid) -> Result<Cart, CartsServiceError>;

    /// Deletes a cart and (by cascade) its items.
    async fn delete_cart(&self, cart: CartUuid) -> Result<(), CartsServiceError>;

    /// Add one unit of a product; an existing line for the product is
    /// incremented instead of duplicated. The unit price snapshots the
    /// product's current suggested retail price.
    async fn add_item(
        &self,
        cart: CartUuid,
        product: ProductUuid,
    ) -> Result<CartItem, CartsServiceError>;

    /// Set a line's quantity. Values below one are clamped to one.
    async fn update_quantity(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartItem, CartsServiceError>;

    /// Remove a line from the cart.
    async fn remove_item(&self, cart: CartUuid, item: CartItemUuid)
    -> Result<(), CartsServiceError>;

    /// Persist the shipping/billing draft used by checkout. Zip codes
    /// are validated before any write.
    async fn set_addresses(
        &self,
        cart: CartUuid,
        email: String,
        shipping: Address,
        billing: Address,
    ) -> Result<Cart, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, test_address};

    use super::*;

    #[tokio::test]
    async fn create_cart_starts_empty() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = CartUuid::new();

        let cart = ctx.carts.create_cart(uuid, Uuid::now_v7()).await?;

        assert_eq!(cart.uuid, uuid);
        assert!(cart.items.is_empty());
        assert_eq!(cart.subtotal(), 0);
        assert!(cart.shipping_address.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.carts.get_cart(CartUuid::new()).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn add_item_snapshots_srp_as_unit_price() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_named_product("Lip Balm", 4_50).await?;
        let cart = ctx.create_cart().await?;

        let item = ctx.carts.add_item(cart.uuid, product.uuid).await?;

        assert_eq!(item.product_uuid, product.uuid);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_price, product.srp);

        Ok(())
    }

    #[tokio::test]
    async fn adding_same_product_twice_increments_quantity() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_named_product("Lip Balm", 4_50).await?;
        let cart = ctx.create_cart().await?;

        let first = ctx.carts.add_item(cart.uuid, product.uuid).await?;
        let second = ctx.carts.add_item(cart.uuid, product.uuid).await?;

        assert_eq!(first.uuid, second.uuid, "same line, not a new one");
        assert_eq!(second.quantity, 2);

        let cart = ctx.carts.get_cart(cart.uuid).await?;
        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unknown_product_returns_product_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.create_cart().await?;

        let result = ctx.carts.add_item(cart.uuid, ProductUuid::new()).await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_quantity_clamps_to_minimum_one() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_named_product("Lip Balm", 4_50).await?;
        let cart = ctx.create_cart().await?;
        let item = ctx.carts.add_item(cart.uuid, product.uuid).await?;

        let updated = ctx.carts.update_quantity(cart.uuid, item.uuid, 0).await?;
        assert_eq!(updated.quantity, 1);

        let updated = ctx.carts.update_quantity(cart.uuid, item.uuid, 7).await?;
        assert_eq!(updated.quantity, 7);

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_empties_the_line() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_named_product("Lip Balm", 4_50).await?;
        let cart = ctx.create_cart().await?;
        let item = ctx.carts.add_item(cart.uuid, product.uuid).await?;

        ctx.carts.remove_item(cart.uuid, item.uuid).await?;

        let cart = ctx.carts.get_cart(cart.uuid).await?;
        assert!(cart.items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn subtotal_reflects_lines() -> TestResult {
        let ctx = TestContext::new().await;

        let tea = ctx.create_priced_product("Herbal Tea", 10_00).await?;
        let oil = ctx.create_priced_product("Face Oil", 15_00).await?;
        let cart = ctx.create_cart().await?;

        ctx.carts.add_item(cart.uuid, tea.uuid).await?;
        ctx.carts.add_item(cart.uuid, tea.uuid).await?;
        ctx.carts.add_item(cart.uuid, oil.uuid).await?;

        let cart = ctx.carts.get_cart(cart.uuid).await?;

        assert_eq!(cart.subtotal(), 35_00);
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn set_addresses_persists_the_draft() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.create_cart().await?;

        let updated = ctx
            .carts
            .set_addresses(
                cart.uuid,
                "jordan@example.com".to_string(),
                test_address("97201"),
                test_address("97201-1234"),
            )
            .await?;

        assert_eq!(updated.contact_email.as_deref(), Some("jordan@example.com"));
        assert_eq!(
            updated.shipping_address.as_ref().map(|a| a.zip.as_str()),
            Some("97201")
        );

        // Survives a fresh read (server-side, not session storage).
        let reread = ctx.carts.get_cart(cart.uuid).await?;
        assert!(reread.billing_address.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn set_addresses_rejects_bad_zip() -> TestResult {
        let ctx = TestContext::new().await;
        let cart = ctx.create_cart().await?;

        let result = ctx
            .carts
            .set_addresses(
                cart.uuid,
                "jordan@example.com".to_string(),
                test_address("9720"),
                test_address("97201"),
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::InvalidZipFormat)),
            "expected InvalidZipFormat, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_cart_cascades_to_items() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_named_product("Lip Balm", 4_50).await?;
        let cart = ctx.create_cart().await?;
        ctx.carts.add_item(cart.uuid, product.uuid).await?;

        ctx.carts.delete_cart(cart.uuid).await?;

        let result = ctx.carts.get_cart(cart.uuid).await;
        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound after delete, got {result:?}"
        );

        Ok(())
    }
}
