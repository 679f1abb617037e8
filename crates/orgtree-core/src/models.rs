//! Domain models for the organization hierarchy.
//!
//! [`organization::Organization`] is the persisted row;
//! [`tree::OrganizationTree`] is the transient subtree built by the
//! traversal engine.

pub mod organization;
pub mod tree;
