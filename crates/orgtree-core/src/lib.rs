//! orgtree core: organization hierarchy models, lifecycle rules,
//! traversal engine and the cache-aside service.
//!
//! Storage backends implement [`repository::OrganizationRepository`];
//! cache backends implement [`cache::CacheStore`]. Both are plugged into
//! [`service::OrganizationService`].

pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod service;
pub mod traversal;

pub use cache::{CacheError, CacheKeys, CacheStore, MemoryCache};
pub use config::{InvalidationPolicy, ServiceConfig};
pub use error::{OrgTreeError, OrgTreeResult};
pub use lifecycle::{LifecycleState, RowFilter, Transition};
pub use service::OrganizationService;
