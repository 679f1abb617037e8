//! Materialized descendant tree.

use serde::{Deserialize, Serialize};

use super::organization::{Organization, OrganizationId};

/// One organization together with its direct children, ordered by
/// creation time.
///
/// Built fresh by every descendant query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationTree {
    #[serde(flatten)]
    pub organization: Organization,
    pub children: Vec<OrganizationTree>,
}

impl OrganizationTree {
    pub fn id(&self) -> OrganizationId {
        self.organization.id
    }

    /// Number of nodes in the tree, root included.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of levels, so a lone root has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(OrganizationTree::depth)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order iterator over every node.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    pub fn find(&self, id: OrganizationId) -> Option<&OrganizationTree> {
        self.iter().find(|node| node.id() == id)
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a OrganizationTree>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a OrganizationTree;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
