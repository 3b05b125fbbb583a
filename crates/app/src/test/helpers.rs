//! Test Helpers

use crate::domain::carts::models::Address;

/// A complete Portland address with the given zip, ten-digit phone
/// included.
pub(crate) fn test_address(zip: &str) -> Address {
    Address {
        name: "Jordan Avery".to_string(),
        line1: "1300 SW 5th Ave".to_string(),
        line2: None,
        city: "Portland".to_string(),
        state: "OR".to_string(),
        zip: zip.to_string(),
        country: "US".to_string(),
        phone: Some("5035551234".to_string()),
    }
}
