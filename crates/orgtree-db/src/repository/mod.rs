//! SurrealDB repository implementations.

mod organization;

pub use organization::SurrealOrganizationRepository;
