//! Service configuration.

/// Key prefix used when no other prefix is configured.
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "cache:org:organizations:id:";

/// What a mutation reports when the cache cannot be invalidated after
/// the write went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// The invalidation failure becomes the operation's error.
    #[default]
    Strict,
    /// The failure is logged and the operation reports success.
    BestEffort,
}

/// Configuration for [`crate::service::OrganizationService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Prefix prepended to every organization id in cache keys.
    pub cache_key_prefix: String,
    /// Capacity for an in-process [`crate::cache::MemoryCache`].
    pub cache_capacity: usize,
    pub invalidation: InvalidationPolicy,
    /// Optional cap on the number of levels a traversal walks in either
    /// direction. `None` walks the whole hierarchy; cycles are still
    /// caught by the visited-set check.
    pub max_depth: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.into(),
            cache_capacity: 10_000,
            invalidation: InvalidationPolicy::Strict,
            max_depth: None,
        }
    }
}
