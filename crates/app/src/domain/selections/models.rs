//! Selection Models

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    domain::{catalog::models::ProductUuid, projects::models::ProjectUuid},
    uuids::TypedUuid,
};

/// Points consumed by each product selection, uniform across products
/// and pack tiers.
pub const SELECTION_COST: u64 = 1000;

/// Selection UUID
pub type SelectionUuid = TypedUuid<Selection>;

/// Selection Model
///
/// Link between a project and a catalog product, optionally carrying
/// project-specific overrides of the product's name, price, or image.
#[derive(Debug, Clone)]
pub struct Selection {
    pub uuid: SelectionUuid,
    pub project_uuid: ProjectUuid,
    pub product_uuid: ProductUuid,
    pub custom_name: Option<String>,
    pub custom_price: Option<u64>,
    pub custom_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project-specific overrides applied at selection time or later.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionOverrides {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub image_url: Option<String>,
}

/// Role of an authenticated user. Members and samplers may browse but
/// not spend project points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Admin,
    Member,
    Sampler,
}

impl Role {
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Member | Self::Sampler)
    }
}

/// An authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub uuid: Uuid,
    pub role: Role,
}

/// The identity attached to a request. Authentication itself is
/// delegated upstream; this layer only sees the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Actor),
}

/// Display data for the post-selection confirmation view.
#[derive(Debug, Clone)]
pub struct SelectionConfirmation {
    pub selection: Selection,
    pub project: crate::domain::projects::models::Project,
    pub product: crate::domain::catalog::models::Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_and_samplers_are_restricted() {
        assert!(Role::Member.is_restricted());
        assert!(Role::Sampler.is_restricted());
        assert!(!Role::Owner.is_restricted());
        assert!(!Role::Admin.is_restricted());
    }
}
