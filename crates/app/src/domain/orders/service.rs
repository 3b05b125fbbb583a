//! Checkout service.
//!
//! Owns order finalization end to end: totals, payment capture, and
//! the mirror into the hosted commerce platform. It is the only
//! writer of order status, so every transition in the system passes
//! through the guarded updates here.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use uuid::Uuid;

use crate::{
    clients::{
        commerce::{CommerceClient, ExternalAddress, ExternalLineItem, ExternalOrder},
        payments::{PaymentOutcome, PaymentsClient},
        shipping::ShippingQuoter,
    },
    database::Db,
    domain::{
        carts::{
            models::{Address, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        catalog::models::ProductUuid,
        coupons::repository::PgCouponsRepository,
        orders::{
            errors::CheckoutError,
            models::{OrderStatus, OrderTotals, OrderUuid, SampleOrder, VariantMapping},
            phone::format_phone,
            repository::PgOrdersRepository,
        },
    },
};

const CURRENCY: &str = "usd";

/// Mirror retry policy for the background worker.
const MIRROR_ATTEMPTS: u32 = 3;
const MIRROR_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Outcome of one `retry_pending_mirrors` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorRunReport {
    pub scanned: usize,
    pub mirrored: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct PgCheckoutService {
    db: Db,
    orders: PgOrdersRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
    coupons: PgCouponsRepository,
    payments: Arc<dyn PaymentsClient>,
    commerce: Arc<dyn CommerceClient>,
    shipping: Arc<dyn ShippingQuoter>,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(
        db: Db,
        payments: Arc<dyn PaymentsClient>,
        commerce: Arc<dyn CommerceClient>,
        shipping: Arc<dyn ShippingQuoter>,
    ) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            coupons: PgCouponsRepository::new(),
            payments,
            commerce,
            shipping,
        }
    }
}

fn external_address(address: &Address) -> ExternalAddress {
    ExternalAddress {
        name: address.name.clone(),
        line1: address.line1.clone(),
        line2: address.line2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip.clone(),
        country: address.country.clone(),
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    async fn checkout(
        &self,
        user: Uuid,
        cart: CartUuid,
        coupon_code: Option<String>,
    ) -> Result<SampleOrder, CheckoutError> {
        // Read phase: cart draft, lines, coupon.
        let mut tx = self.db.begin().await?;

        let cart_record = self.carts.get_cart(&mut tx, cart).await.map_err(|error| {
            if matches!(error, sqlx::Error::RowNotFound) {
                CheckoutError::CartNotFound
            } else {
                error.into()
            }
        })?;

        let items = self.cart_items.get_cart_items(&mut tx, cart).await?;

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (Some(email), Some(shipping_address), Some(billing_address)) = (
            cart_record.contact_email,
            cart_record.shipping_address,
            cart_record.billing_address,
        ) else {
            return Err(CheckoutError::ShippingDetailsMissing);
        };

        let phone = shipping_address
            .phone
            .clone()
            .ok_or(CheckoutError::ShippingDetailsMissing)?;

        let subtotal: u64 = items
            .iter()
            .map(|item| item.unit_price.saturating_mul(u64::from(item.quantity)))
            .sum();

        let discount = match coupon_code {
            Some(code) => {
                let coupon = self
                    .coupons
                    .get_coupon_by_code(&mut tx, &code.trim().to_lowercase())
                    .await
                    .map_err(|error| {
                        if matches!(error, sqlx::Error::RowNotFound) {
                            CheckoutError::CouponNotFound
                        } else {
                            error.into()
                        }
                    })?;

                coupon
                    .discount_at(subtotal, Timestamp::now())
                    .map_err(CheckoutError::InvalidCoupon)?
            }
            None => 0,
        };

        tx.commit().await?;

        let item_count: u32 = items.iter().map(|item| item.quantity).sum();

        let shipping_cost = self
            .shipping
            .quote(
                shipping_address.zip.clone(),
                shipping_address.country.clone(),
                item_count,
            )
            .await?;

        let totals = OrderTotals {
            subtotal,
            discount,
            shipping_cost,
        };

        // Order and lines land together or not at all.
        let order_uuid = OrderUuid::new();
        let mut tx = self.db.begin().await?;

        self.orders
            .create_order(
                &mut tx,
                order_uuid,
                user,
                &email,
                &phone,
                &shipping_address,
                &billing_address,
                totals,
            )
            .await?;

        for item in &items {
            self.orders
                .create_order_item(
                    &mut tx,
                    order_uuid,
                    item.product_uuid,
                    item.quantity,
                    item.unit_price,
                )
                .await?;
        }

        tx.commit().await?;

        let intent = self
            .payments
            .create_intent(totals.total(), CURRENCY.to_string())
            .await?;

        let mut tx = self.db.begin().await?;
        self.orders
            .set_payment_intent(&mut tx, order_uuid, &intent.id)
            .await?;
        tx.commit().await?;

        match self.payments.confirm_intent(intent.id).await? {
            PaymentOutcome::Succeeded => {}
            PaymentOutcome::Declined(message) => {
                tracing::warn!(order = %order_uuid, %message, "payment declined");
                return Err(CheckoutError::PaymentDeclined(message));
            }
        }

        // Capture: the order becomes the durable record and the cart
        // draft is retired, atomically.
        let mut tx = self.db.begin().await?;

        self.orders
            .set_order_status(
                &mut tx,
                order_uuid,
                OrderStatus::Pending,
                OrderStatus::MirrorPending,
            )
            .await?
            .ok_or(CheckoutError::InvalidStatusTransition)?;

        self.carts.delete_cart(&mut tx, cart).await?;

        tx.commit().await?;

        tracing::info!(order = %order_uuid, total = totals.total(), "payment captured");

        // One synchronous mirror attempt. Failure is not fatal: the
        // order stays MirrorPending for the retry worker.
        match self.attempt_mirror(order_uuid).await {
            Ok(order) => Ok(order),
            Err(error) => {
                tracing::warn!(order = %order_uuid, %error, "mirror attempt failed");
                self.get_order(order_uuid).await
            }
        }
    }

    async fn attempt_mirror(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;
        let items = self.orders.get_order_items(&mut tx, order).await?;

        if record.status != OrderStatus::MirrorPending {
            return Err(CheckoutError::InvalidStatusTransition);
        }

        let phone = format_phone(&record.contact_phone)?;

        let mut line_items = Vec::with_capacity(items.len());

        for item in &items {
            let mapping = self
                .orders
                .get_variant_mapping(&mut tx, item.product_uuid)
                .await?
                .ok_or(CheckoutError::MissingVariantMapping)?;

            line_items.push(ExternalLineItem {
                variant_id: mapping.external_variant_id,
                quantity: item.quantity,
            });
        }

        tx.commit().await?;

        let external_id = self
            .commerce
            .create_order(ExternalOrder {
                email: record.contact_email.clone(),
                phone,
                shipping_address: external_address(&record.shipping_address),
                line_items,
            })
            .await?;

        let mut tx = self.db.begin().await?;

        let mut updated = self
            .orders
            .set_external_order(&mut tx, order, &external_id)
            .await?
            .ok_or(CheckoutError::InvalidStatusTransition)?;

        tx.commit().await?;

        tracing::info!(order = %order, external = %external_id, "order mirrored");

        updated.items = items;

        Ok(updated)
    }

    async fn retry_pending_mirrors(&self, limit: u32) -> Result<MirrorRunReport, CheckoutError> {
        let mut tx = self.db.begin().await?;
        let pending = self.orders.list_mirror_pending(&mut tx, limit).await?;
        tx.commit().await?;

        let mut report = MirrorRunReport {
            scanned: pending.len(),
            ..MirrorRunReport::default()
        };

        for order in pending {
            let mut mirrored = false;

            for attempt in 1..=MIRROR_ATTEMPTS {
                match self.attempt_mirror(order.uuid).await {
                    Ok(_) => {
                        mirrored = true;
                        break;
                    }
                    Err(
                        error @ (CheckoutError::InvalidPhoneFormat(_)
                        | CheckoutError::MissingVariantMapping),
                    ) => {
                        // Not transient; retrying cannot help until an
                        // operator fixes the data.
                        tracing::warn!(order = %order.uuid, %error, "mirror blocked");
                        break;
                    }
                    Err(error) => {
                        tracing::warn!(order = %order.uuid, attempt, %error, "mirror failed");

                        if attempt < MIRROR_ATTEMPTS {
                            tokio::time::sleep(MIRROR_RETRY_DELAY).await;
                        }
                    }
                }
            }

            if mirrored {
                report.mirrored += 1;
            } else {
                report.failed += 1;
            }
        }

        Ok(report)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.orders.get_order(&mut tx, order).await?;
        let items = self.orders.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        record.items = items;

        Ok(record)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<SampleOrder>, CheckoutError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_orders(&mut tx, status).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn cancel_order(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;

        if !record.status.can_transition_to(OrderStatus::Canceled) {
            return Err(CheckoutError::InvalidStatusTransition);
        }

        let canceled = self
            .orders
            .set_order_status(&mut tx, order, record.status, OrderStatus::Canceled)
            .await?
            .ok_or(CheckoutError::InvalidStatusTransition)?;

        tx.commit().await?;

        tracing::info!(order = %order, "order canceled");

        Ok(canceled)
    }

    async fn complete_order(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError> {
        let mut tx = self.db.begin().await?;

        let completed = self
            .orders
            .set_order_status(
                &mut tx,
                order,
                OrderStatus::Processing,
                OrderStatus::Completed,
            )
            .await?
            .ok_or(CheckoutError::InvalidStatusTransition)?;

        tx.commit().await?;

        Ok(completed)
    }

    async fn map_variant(
        &self,
        product: ProductUuid,
        external_variant_id: String,
    ) -> Result<VariantMapping, CheckoutError> {
        let mut tx = self.db.begin().await?;

        let mapping = self
            .orders
            .upsert_variant_mapping(&mut tx, product, &external_variant_id)
            .await?;

        tx.commit().await?;

        Ok(mapping)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Finalize a cart into an order.
    ///
    /// The order and its lines are created `Pending` before any money
    /// moves. A declined payment leaves them that way and surfaces the
    /// processor's message. A captured payment always ends with a
    /// durable order in `MirrorPending` or better, with the cart
    /// retired; a failed mirror never unwinds the charge.
    async fn checkout(
        &self,
        user: Uuid,
        cart: CartUuid,
        coupon_code: Option<String>,
    ) -> Result<SampleOrder, CheckoutError>;

    /// One mirror attempt for a `MirrorPending` order: normalize the
    /// contact phone, resolve variant mappings, create the external
    /// order, and move to `Processing`.
    async fn attempt_mirror(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError>;

    /// Drain up to `limit` `MirrorPending` orders, giving each a fixed
    /// number of attempts with a fixed delay between them.
    async fn retry_pending_mirrors(&self, limit: u32) -> Result<MirrorRunReport, CheckoutError>;

    async fn get_order(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError>;

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<SampleOrder>, CheckoutError>;

    /// Cancel an order from any non-terminal state.
    async fn cancel_order(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError>;

    /// Mark a mirrored order fulfilled. Operator-invoked.
    async fn complete_order(&self, order: OrderUuid) -> Result<SampleOrder, CheckoutError>;

    /// Point a catalog product at the commerce platform variant it
    /// mirrors to.
    async fn map_variant(
        &self,
        product: ProductUuid,
        external_variant_id: String,
    ) -> Result<VariantMapping, CheckoutError>;
}
