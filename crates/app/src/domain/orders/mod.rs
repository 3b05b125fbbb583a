//! Orders
//!
//! Checkout, payment capture, and the mirror into the external
//! commerce platform that owns fulfillment.

pub mod errors;
pub mod models;
pub mod phone;
pub(crate) mod repository;
pub mod service;

pub use errors::CheckoutError;
pub use service::*;
