//! Shared test infrastructure: per-test databases and a prewired
//! service context.

mod context;
mod helpers;

pub(crate) use context::TestContext;
pub(crate) use helpers::test_address;
