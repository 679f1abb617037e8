//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Read operations take a
//! [`RowFilter`] so the caller decides whether disabled rows are visible;
//! soft-deleted rows are never returned.

use crate::error::OrgTreeResult;
use crate::lifecycle::{RowFilter, Transition};
use crate::models::organization::{CreateOrganization, Organization, OrganizationId};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait OrganizationRepository: Send + Sync {
    /// Insert a new row and return it with its backend-assigned id.
    ///
    /// Parent existence is the caller's concern.
    fn insert(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = OrgTreeResult<Organization>> + Send;

    /// Point lookup; `NotFound` when no row passes `filter`.
    fn find_by_id(
        &self,
        id: OrganizationId,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Organization>> + Send;

    /// All rows with the given name, oldest first.
    fn find_by_name(
        &self,
        name: &str,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Vec<Organization>>> + Send;

    /// Direct children of `parent_id`, oldest first.
    fn find_by_parent(
        &self,
        parent_id: OrganizationId,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Vec<Organization>>> + Send;

    /// Rows without a parent, oldest first.
    fn find_roots(
        &self,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Vec<Organization>>> + Send;

    /// Page through the children of `parent_id` (roots when `None`).
    fn list_children(
        &self,
        parent_id: Option<OrganizationId>,
        filter: RowFilter,
        pagination: Pagination,
    ) -> impl Future<Output = OrgTreeResult<PaginatedResult<Organization>>> + Send;

    /// Rename an active row. `NotFound` if the row is missing, disabled or
    /// deleted. A `None` name only bumps `updated_at`.
    fn update_name(
        &self,
        id: OrganizationId,
        name: Option<String>,
    ) -> impl Future<Output = OrgTreeResult<Organization>> + Send;

    /// Apply `transition` to every id in one statement, guarded by
    /// [`Transition::guard`]. Returns the number of rows changed; ids that
    /// fail the guard or do not exist are skipped silently.
    fn apply_transition(
        &self,
        ids: &[OrganizationId],
        transition: Transition,
    ) -> impl Future<Output = OrgTreeResult<u64>> + Send;
}
