//! Selections
//!
//! Attaching a catalog product to a project's brand-building plan,
//! paid for from the project's points ledger.

pub mod errors;
pub mod models;
pub(crate) mod repository;
pub mod service;

pub use errors::SelectionsServiceError;
pub use service::*;
