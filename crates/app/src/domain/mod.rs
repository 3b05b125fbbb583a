//! Domain services, one module per aggregate.

pub mod carts;
pub mod catalog;
pub mod coupons;
pub mod orders;
pub mod projects;
pub mod selections;
