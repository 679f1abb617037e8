//! Organization service: cache-aside lookups, lifecycle transitions,
//! batch mutations and hierarchy queries.

use tracing::{debug, info, warn};

use crate::cache::{CacheKeys, CacheStore};
use crate::config::{InvalidationPolicy, ServiceConfig};
use crate::error::{OrgTreeError, OrgTreeResult};
use crate::lifecycle::{RowFilter, Transition};
use crate::models::organization::{
    CreateOrganization, Organization, OrganizationId, UpdateOrganization,
};
use crate::models::tree::OrganizationTree;
use crate::repository::{OrganizationRepository, PaginatedResult, Pagination};
use crate::traversal::{RepositorySource, TreeWalker};

/// Organization service.
///
/// Generic over the repository and cache implementations so that this
/// layer has no dependency on a concrete backend.
///
/// Only [`get`](Self::get) goes through the cache. Every mutation deletes
/// the cache entry of each id it was asked to touch once the write has
/// been attempted, whether or not the row matched and whether or not the
/// write succeeded.
pub struct OrganizationService<R: OrganizationRepository, C: CacheStore> {
    repo: R,
    cache: C,
    keys: CacheKeys,
    walker: TreeWalker,
    invalidation: InvalidationPolicy,
}

impl<R: OrganizationRepository, C: CacheStore> OrganizationService<R, C> {
    pub fn new(repo: R, cache: C, config: ServiceConfig) -> Self {
        Self {
            repo,
            cache,
            keys: CacheKeys::new(config.cache_key_prefix),
            walker: TreeWalker::new(config.max_depth),
            invalidation: config.invalidation,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn cache_keys(&self) -> &CacheKeys {
        &self.keys
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Existing (not soft-deleted) organization by id, served from the
    /// cache when possible.
    pub async fn get(&self, id: OrganizationId) -> OrgTreeResult<Organization> {
        let key = self.keys.organization(id);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => match serde_json::from_str::<Organization>(&payload) {
                Ok(org) => return Ok(org),
                Err(e) => {
                    warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                    if let Err(e) = self.cache.delete(std::slice::from_ref(&key)).await {
                        warn!(key = %key, error = %e, "Failed to drop cache entry");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, falling back to store"),
        }

        let org = self.repo.find_by_id(id, RowFilter::Existing).await?;

        match serde_json::to_string(&org) {
            Ok(payload) => {
                if let Err(e) = self.cache.set(&key, payload).await {
                    warn!(key = %key, error = %e, "Failed to populate cache");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to encode cache entry"),
        }

        Ok(org)
    }

    /// Active organization by id. Always read from the store.
    pub async fn get_active(&self, id: OrganizationId) -> OrgTreeResult<Organization> {
        self.repo.find_by_id(id, RowFilter::Active).await
    }

    pub async fn find_by_name(
        &self,
        name: &str,
        filter: RowFilter,
    ) -> OrgTreeResult<Vec<Organization>> {
        self.repo.find_by_name(name, filter).await
    }

    pub async fn find_roots(&self, filter: RowFilter) -> OrgTreeResult<Vec<Organization>> {
        self.repo.find_roots(filter).await
    }

    /// Page through direct children of `parent_id`; roots when `None`.
    pub async fn list_children(
        &self,
        parent_id: Option<OrganizationId>,
        filter: RowFilter,
        pagination: Pagination,
    ) -> OrgTreeResult<PaginatedResult<Organization>> {
        self.repo
            .list_children(parent_id, filter, pagination)
            .await
    }

    // -------------------------------------------------------------------
    // Hierarchy
    // -------------------------------------------------------------------

    /// Root-to-node chain ending with `id`.
    pub async fn ancestors(&self, id: OrganizationId) -> OrgTreeResult<Vec<Organization>> {
        self.walker
            .ancestors(&RepositorySource::new(&self.repo), id)
            .await
    }

    /// Subtree rooted at `id`. With `active_only`, disabled rows and
    /// everything beneath them are left out, the root included.
    pub async fn descendants(
        &self,
        id: OrganizationId,
        active_only: bool,
    ) -> OrgTreeResult<OrganizationTree> {
        self.walker
            .descendants(
                &RepositorySource::new(&self.repo),
                id,
                RowFilter::for_active_only(active_only),
            )
            .await
    }

    /// Whether `ancestor_id` sits strictly above `id`.
    pub async fn is_ancestor(
        &self,
        ancestor_id: OrganizationId,
        id: OrganizationId,
    ) -> OrgTreeResult<bool> {
        if ancestor_id == id {
            return Ok(false);
        }
        let chain = self.ancestors(id).await?;
        Ok(chain.iter().any(|org| org.id == ancestor_id))
    }

    // -------------------------------------------------------------------
    // Creation and updates
    // -------------------------------------------------------------------

    /// Create an organization under an existing parent, or a new root.
    ///
    /// A parent id of 0 is the "no parent" sentinel and creates a root.
    /// The new row is not cached.
    pub async fn create(&self, mut input: CreateOrganization) -> OrgTreeResult<Organization> {
        input.parent_id = input.parent_id.filter(|&parent_id| parent_id != 0);
        if input.name.trim().is_empty() {
            return Err(OrgTreeError::Validation {
                message: "organization name must not be empty".into(),
            });
        }

        if let Some(parent_id) = input.parent_id {
            match self.get(parent_id).await {
                Ok(_) => {}
                Err(OrgTreeError::NotFound { .. }) => {
                    return Err(OrgTreeError::ParentNotFound { parent_id });
                }
                Err(e) => return Err(e),
            }
        }

        let org = self.repo.insert(input).await?;
        info!(id = org.id, parent_id = ?org.parent_id, "Created organization");
        Ok(org)
    }

    /// Rename an active organization.
    pub async fn update(
        &self,
        id: OrganizationId,
        input: UpdateOrganization,
    ) -> OrgTreeResult<Organization> {
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(OrgTreeError::Validation {
                message: "organization name must not be empty".into(),
            });
        }

        let written = self.repo.update_name(id, input.name).await;
        let invalidated = self.invalidate(&[id]).await;
        let org = written?;
        invalidated?;
        Ok(org)
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Active -> Disabled. No-op for disabled, deleted or missing rows.
    pub async fn disable(&self, id: OrganizationId) -> OrgTreeResult<()> {
        self.transition(&[id], Transition::Disable).await.map(|_| ())
    }

    /// Disabled -> Active. No-op for deleted or missing rows.
    pub async fn enable(&self, id: OrganizationId) -> OrgTreeResult<()> {
        self.transition(&[id], Transition::Enable).await.map(|_| ())
    }

    /// Mark a row deleted. No-op if it is already deleted or missing.
    pub async fn soft_delete(&self, id: OrganizationId) -> OrgTreeResult<()> {
        self.transition(&[id], Transition::SoftDelete)
            .await
            .map(|_| ())
    }

    /// Soft-delete an organization that must currently exist.
    pub async fn delete(&self, id: OrganizationId) -> OrgTreeResult<()> {
        self.get(id).await?;
        self.soft_delete(id).await
    }

    /// Clear `deleted_at`, keeping whatever `disabled_at` holds.
    pub async fn restore(&self, id: OrganizationId) -> OrgTreeResult<()> {
        self.transition(&[id], Transition::Restore).await.map(|_| ())
    }

    // -------------------------------------------------------------------
    // Batch mutations
    // -------------------------------------------------------------------

    /// Soft-delete every listed row that is not deleted yet. Returns the
    /// number of rows changed.
    pub async fn batch_soft_delete(&self, ids: &[OrganizationId]) -> OrgTreeResult<u64> {
        self.batch(ids, Transition::SoftDelete).await
    }

    /// Disable every listed row that is currently active. Returns the
    /// number of rows changed.
    pub async fn batch_disable(&self, ids: &[OrganizationId]) -> OrgTreeResult<u64> {
        self.batch(ids, Transition::Disable).await
    }

    async fn batch(&self, ids: &[OrganizationId], transition: Transition) -> OrgTreeResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        self.transition(&unique, transition).await
    }

    async fn transition(
        &self,
        ids: &[OrganizationId],
        transition: Transition,
    ) -> OrgTreeResult<u64> {
        let written = self.repo.apply_transition(ids, transition).await;
        let invalidated = self.invalidate(ids).await;
        let affected = written?;
        invalidated?;

        debug!(
            transition = transition.name(),
            requested = ids.len(),
            affected,
            "Applied lifecycle transition"
        );
        Ok(affected)
    }

    async fn invalidate(&self, ids: &[OrganizationId]) -> OrgTreeResult<()> {
        let keys = self.keys.organizations(ids);
        match self.cache.delete(&keys).await {
            Ok(()) => Ok(()),
            Err(e) => match self.invalidation {
                InvalidationPolicy::Strict => Err(e.into()),
                InvalidationPolicy::BestEffort => {
                    warn!(?ids, error = %e, "Cache invalidation failed, entries may be stale");
                    Ok(())
                }
            },
        }
    }
}
