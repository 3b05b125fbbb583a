//! Checkout service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    clients::{commerce::CommerceError, payments::PaymentsError, shipping::ShippingError},
    domain::{coupons::models::InvalidCouponReason, orders::phone::PhoneFormatError},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("order not found")]
    NotFound,

    #[error("cart not found")]
    CartNotFound,

    #[error("cart has no items")]
    EmptyCart,

    #[error("cart is missing contact or address details")]
    ShippingDetailsMissing,

    #[error("coupon code not recognised")]
    CouponNotFound,

    #[error("coupon cannot be applied: {0:?}")]
    InvalidCoupon(InvalidCouponReason),

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("contact phone cannot be normalized")]
    InvalidPhoneFormat(#[from] PhoneFormatError),

    #[error("product has no external variant mapping")]
    MissingVariantMapping,

    #[error("order is not in a state that allows this transition")]
    InvalidStatusTransition,

    #[error("payment processor error")]
    Payments(#[from] PaymentsError),

    #[error("commerce platform error")]
    Commerce(#[from] CommerceError),

    #[error("shipping rate error")]
    Shipping(#[from] ShippingError),

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CheckoutError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation) => {
                Self::InvalidData
            }
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
