//! Tree traversal engine.
//!
//! Both directions are walked with one point query per node, strictly in
//! sequence. [`HierarchySource`] is the only thing the walker knows about
//! the backend, so a source that prefetches a whole subtree in one
//! set-oriented query can be dropped in without touching callers.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{OrgTreeError, OrgTreeResult};
use crate::lifecycle::RowFilter;
use crate::models::organization::{Organization, OrganizationId};
use crate::models::tree::OrganizationTree;
use crate::repository::OrganizationRepository;

/// Point and child lookups the walker is built on.
pub trait HierarchySource: Send + Sync {
    fn node(
        &self,
        id: OrganizationId,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Organization>> + Send;

    /// Direct children in creation order.
    fn children(
        &self,
        parent_id: OrganizationId,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Vec<Organization>>> + Send;
}

/// Serves traversal lookups straight from a repository, uncached.
pub struct RepositorySource<'a, R> {
    repo: &'a R,
}

impl<'a, R: OrganizationRepository> RepositorySource<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }
}

impl<R: OrganizationRepository> HierarchySource for RepositorySource<'_, R> {
    fn node(
        &self,
        id: OrganizationId,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Organization>> + Send {
        self.repo.find_by_id(id, filter)
    }

    fn children(
        &self,
        parent_id: OrganizationId,
        filter: RowFilter,
    ) -> impl Future<Output = OrgTreeResult<Vec<Organization>>> + Send {
        self.repo.find_by_parent(parent_id, filter)
    }
}

/// Walks parent links up and child links down.
///
/// Every walk tracks the ids it has visited and fails with
/// [`OrgTreeError::CycleDetected`] on a repeat. Depth is unbounded unless
/// a `max_depth` is set, in which case walking past it fails with
/// [`OrgTreeError::DepthLimitExceeded`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeWalker {
    max_depth: Option<usize>,
}

impl TreeWalker {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth: max_depth.map(|limit| limit.max(1)),
        }
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    fn check_depth(&self, id: OrganizationId, depth: usize) -> OrgTreeResult<()> {
        match self.max_depth {
            Some(limit) if depth >= limit => Err(OrgTreeError::DepthLimitExceeded { id, limit }),
            _ => Ok(()),
        }
    }

    /// Root-to-node chain ending with `id` itself.
    ///
    /// Every step uses the existing-only filter, so a soft-deleted row
    /// anywhere on the chain fails the walk with `NotFound`.
    pub async fn ancestors<S: HierarchySource>(
        &self,
        source: &S,
        id: OrganizationId,
    ) -> OrgTreeResult<Vec<Organization>> {
        let mut chain: Vec<Organization> = Vec::new();
        let mut visited = HashSet::new();
        let mut current = id;

        loop {
            if !visited.insert(current) {
                return Err(OrgTreeError::CycleDetected { id: current });
            }
            self.check_depth(current, chain.len())?;

            let org = source.node(current, RowFilter::Existing).await?;
            let parent = org.parent_id;
            chain.push(org);

            match parent {
                Some(parent_id) => current = parent_id,
                None => break,
            }
        }

        chain.reverse();
        debug!(id, depth = chain.len(), "Resolved ancestor chain");
        Ok(chain)
    }

    /// Subtree rooted at `id`, expanded depth-first.
    ///
    /// `filter` applies to the root and to every child query.
    pub async fn descendants<S: HierarchySource>(
        &self,
        source: &S,
        id: OrganizationId,
        filter: RowFilter,
    ) -> OrgTreeResult<OrganizationTree> {
        let root = source.node(id, filter).await?;

        let mut children_of: HashMap<OrganizationId, Vec<Organization>> = HashMap::new();
        let mut visited = HashSet::from([root.id]);
        let mut stack = vec![(root.id, 1usize)];
        let mut queries = 1usize;

        while let Some((current, depth)) = stack.pop() {
            let children = source.children(current, filter).await?;
            queries += 1;
            if children.is_empty() {
                continue;
            }
            self.check_depth(current, depth)?;
            // Reverse push so the oldest child is expanded next.
            for child in children.iter().rev() {
                if !visited.insert(child.id) {
                    return Err(OrgTreeError::CycleDetected { id: child.id });
                }
                stack.push((child.id, depth + 1));
            }
            children_of.insert(current, children);
        }

        let tree = assemble(root, &mut children_of);
        debug!(id, nodes = tree.len(), queries, "Built descendant tree");
        Ok(tree)
    }
}

fn assemble(
    organization: Organization,
    children_of: &mut HashMap<OrganizationId, Vec<Organization>>,
) -> OrganizationTree {
    let children = children_of
        .remove(&organization.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| assemble(child, children_of))
        .collect();
    OrganizationTree {
        organization,
        children,
    }
}
