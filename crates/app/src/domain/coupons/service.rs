//! Coupons service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::coupons::{
        errors::CouponsServiceError,
        models::{Coupon, CouponUuid, Discount},
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

/// Codes are matched case-insensitively, so they are folded to
/// lowercase on the way in.
fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[async_trait]
impl CouponsService for PgCouponsService {
    async fn create_coupon(
        &self,
        code: String,
        discount: Discount,
        valid_from: Option<Timestamp>,
        valid_until: Option<Timestamp>,
    ) -> Result<Coupon, CouponsServiceError> {
        let code = normalize_code(&code);

        if code.is_empty() {
            return Err(CouponsServiceError::EmptyCode);
        }

        if matches!(discount, Discount::Percentage(value) if value > 100) {
            return Err(CouponsServiceError::InvalidPercentage);
        }

        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .create_coupon(
                &mut tx,
                CouponUuid::new(),
                &code,
                discount,
                valid_from,
                valid_until,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(code = %coupon.code, kind = coupon.discount.kind(), "coupon created");

        Ok(coupon)
    }

    async fn get_by_code(&self, code: String) -> Result<Coupon, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .get_coupon_by_code(&mut tx, &normalize_code(&code))
            .await?;

        tx.commit().await?;

        Ok(coupon)
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupons = self.repository.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }

    async fn deactivate(&self, code: String) -> Result<Coupon, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .deactivate_coupon(&mut tx, &normalize_code(&code))
            .await?;

        tx.commit().await?;

        Ok(coupon)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Create a coupon. The code is trimmed and lowercased; percentage
    /// discounts above 100 are rejected.
    async fn create_coupon(
        &self,
        code: String,
        discount: Discount,
        valid_from: Option<Timestamp>,
        valid_until: Option<Timestamp>,
    ) -> Result<Coupon, CouponsServiceError>;

    /// Look up a coupon by code, case-insensitively.
    async fn get_by_code(&self, code: String) -> Result<Coupon, CouponsServiceError>;

    async fn list_coupons(&self) -> Result<Vec<Coupon>, CouponsServiceError>;

    /// Turn a coupon off. Deactivation is permanent.
    async fn deactivate(&self, code: String) -> Result<Coupon, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn create_coupon_lowercases_the_code() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = ctx
            .coupons
            .create_coupon("  WELCOME10 ".to_string(), Discount::Percentage(10), None, None)
            .await?;

        assert_eq!(coupon.code, "welcome10");
        assert!(coupon.is_active);

        let found = ctx.coupons.get_by_code("Welcome10".to_string()).await?;
        assert_eq!(found.uuid, coupon.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons
            .create_coupon("spring".to_string(), Discount::Fixed(5_00), None, None)
            .await?;

        let result = ctx
            .coupons
            .create_coupon("SPRING".to_string(), Discount::Fixed(10_00), None, None)
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn percentage_over_one_hundred_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .create_coupon("big".to_string(), Discount::Percentage(101), None, None)
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::InvalidPercentage)),
            "expected InvalidPercentage, got {result:?}"
        );
    }

    #[tokio::test]
    async fn empty_code_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .create_coupon("   ".to_string(), Discount::Fixed(5_00), None, None)
            .await;

        assert!(
            matches!(result, Err(CouponsServiceError::EmptyCode)),
            "expected EmptyCode, got {result:?}"
        );
    }

    #[tokio::test]
    async fn deactivate_turns_the_coupon_off() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons
            .create_coupon("flash".to_string(), Discount::Percentage(25), None, None)
            .await?;

        let coupon = ctx.coupons.deactivate("flash".to_string()).await?;
        assert!(!coupon.is_active);

        assert_eq!(
            coupon.discount_at(10_00, Timestamp::now()),
            Err(crate::domain::coupons::models::InvalidCouponReason::Inactive)
        );

        Ok(())
    }

    #[tokio::test]
    async fn deactivate_unknown_code_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.deactivate("missing".to_string()).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_coupons_returns_everything() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons
            .create_coupon("one".to_string(), Discount::Fixed(1_00), None, None)
            .await?;
        ctx.coupons
            .create_coupon("two".to_string(), Discount::Percentage(2), None, None)
            .await?;

        let coupons = ctx.coupons.list_coupons().await?;
        assert_eq!(coupons.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn validity_window_round_trips_through_storage() -> TestResult {
        let ctx = TestContext::new().await;

        let from = Timestamp::now();

        let coupon = ctx
            .coupons
            .create_coupon(
                "timed".to_string(),
                Discount::Percentage(10),
                Some(from),
                None,
            )
            .await?;

        assert!(coupon.valid_from.is_some());
        assert!(coupon.valid_until.is_none());

        Ok(())
    }
}
