//! Project Models

use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Project UUID
pub type ProjectUuid = TypedUuid<Project>;

/// Subscription tier a project was created under. Informational here;
/// the initial point allocation is chosen at project inception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackType {
    Start,
    Pro,
    Ultra,
}

impl PackType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pro => "pro",
            Self::Ultra => "ultra",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "pro" => Some(Self::Pro),
            "ultra" => Some(Self::Ultra),
            _ => None,
        }
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl ProjectStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Project Model
///
/// Carries the points ledger: `points` is the total allocation,
/// `points_used` the consumed share. `points_used <= points` holds
/// after every mutation; the database enforces it with a CHECK
/// constraint and every write is a guarded single-statement update.
#[derive(Debug, Clone)]
pub struct Project {
    pub uuid: ProjectUuid,
    pub owner_uuid: Uuid,
    pub name: String,
    pub pack_type: PackType,
    pub status: ProjectStatus,
    pub points: u64,
    pub points_used: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Points still available to spend. Saturating, so a row that
    /// somehow violated the ledger invariant still reads as zero for
    /// decision purposes.
    #[must_use]
    pub fn available_points(&self) -> u64 {
        self.points.saturating_sub(self.points_used)
    }

    #[must_use]
    pub fn can_afford(&self, cost: u64) -> bool {
        self.available_points() >= cost
    }
}

/// New Project Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub uuid: ProjectUuid,
    pub owner_uuid: Uuid,
    pub name: String,
    pub pack_type: PackType,
    pub points: u64,
}

/// Admin point adjustment: deltas against the allocated and consumed
/// fields, applied in one guarded statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointsAdjustment {
    pub allocated_delta: i64,
    pub consumed_delta: i64,
}

impl PointsAdjustment {
    #[must_use]
    pub fn allocate(delta: i64) -> Self {
        Self {
            allocated_delta: delta,
            consumed_delta: 0,
        }
    }

    #[must_use]
    pub fn consume(delta: i64) -> Self {
        Self {
            allocated_delta: 0,
            consumed_delta: delta,
        }
    }
}
