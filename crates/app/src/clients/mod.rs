//! HTTP clients for the external platforms checkout talks to.
//!
//! Each seam is a trait so the checkout service can be exercised
//! against mocks; the `Http*` implementations speak JSON over reqwest.

pub mod commerce;
pub mod payments;
pub mod shipping;
