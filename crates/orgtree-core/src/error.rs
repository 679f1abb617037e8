//! Error types for the organization hierarchy.

use thiserror::Error;

use crate::cache::CacheError;
use crate::models::organization::OrganizationId;

#[derive(Debug, Error)]
pub enum OrgTreeError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Parent organization not found: {parent_id}")]
    ParentNotFound { parent_id: OrganizationId },

    #[error("Cycle detected in organization hierarchy at id {id}")]
    CycleDetected { id: OrganizationId },

    #[error("Hierarchy deeper than {limit} levels at id {id}")]
    DepthLimitExceeded { id: OrganizationId, limit: usize },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrgTreeError {
    /// Not-found signal for a single organization row.
    pub fn organization_not_found(id: OrganizationId) -> Self {
        Self::NotFound {
            entity: "organization".into(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<CacheError> for OrgTreeError {
    fn from(err: CacheError) -> Self {
        OrgTreeError::Cache(err.to_string())
    }
}

pub type OrgTreeResult<T> = Result<T, OrgTreeError>;
