//! Organization domain model.
//!
//! Organizations form a forest through their `parent_id` links. Rows are
//! never physically removed: disabling and soft-deleting only stamp a
//! timestamp, see [`crate::lifecycle`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{Lifecycle, LifecycleState};

/// Surrogate key assigned by the backend on insert.
pub type OrganizationId = i64;

/// A node in the organization hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    /// `None` marks a root.
    pub parent_id: Option<OrganizationId>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while the organization is disabled.
    pub disabled_at: Option<DateTime<Utc>>,
    /// Set while the organization is soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Organization {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle {
            disabled_at: self.disabled_at,
            deleted_at: self.deleted_at,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle().state()
    }
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    /// Must reference an existing organization when set.
    pub parent_id: Option<OrganizationId>,
    pub name: String,
}

impl CreateOrganization {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            parent_id: None,
            name: name.into(),
        }
    }

    pub fn child_of(parent_id: OrganizationId, name: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id),
            name: name.into(),
        }
    }
}

/// Fields that can be updated on an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
}
