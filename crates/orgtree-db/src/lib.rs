//! orgtree Database: SurrealDB connection management and the
//! organization repository.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The [`repository::SurrealOrganizationRepository`] implementation of
//!   `orgtree_core::repository::OrganizationRepository`
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
