//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    clients::{
        commerce::{CommerceConfig, HttpCommerceClient},
        payments::{HttpPaymentsClient, PaymentsConfig},
        shipping::{HttpShippingQuoter, ShippingConfig},
    },
    database::{self, Db},
    domain::{
        carts::service::{CartsService, PgCartsService},
        catalog::service::{CatalogService, PgCatalogService},
        coupons::service::{CouponsService, PgCouponsService},
        orders::service::{CheckoutService, PgCheckoutService},
        projects::service::{PgProjectsService, ProjectsService},
        selections::service::{PgSelectionsService, SelectionsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Connection settings for the three external platforms.
#[derive(Debug, Clone)]
pub struct ClientsConfig {
    pub payments: PaymentsConfig,
    pub commerce: CommerceConfig,
    pub shipping: ShippingConfig,
}

#[derive(Clone)]
pub struct AppContext {
    pub projects: Arc<dyn ProjectsService>,
    pub catalog: Arc<dyn CatalogService>,
    pub selections: Arc<dyn SelectionsService>,
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        clients: ClientsConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self {
            projects: Arc::new(PgProjectsService::new(db.clone())),
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            selections: Arc::new(PgSelectionsService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            checkout: Arc::new(PgCheckoutService::new(
                db,
                Arc::new(HttpPaymentsClient::new(clients.payments)),
                Arc::new(HttpCommerceClient::new(clients.commerce)),
                Arc::new(HttpShippingQuoter::new(clients.shipping)),
            )),
        })
    }
}
