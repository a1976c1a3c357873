//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::CourseTree;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching assembled course trees.
///
/// Implementations must be thread-safe and fail open: a broken cache turns
/// into a miss, never into a failed request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached course tree.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(tree))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_tree(&self, course_id: i64) -> CacheResult<Option<CourseTree>>;

    /// Stores a course tree with optional TTL.
    ///
    /// `ttl_seconds = None` uses the implementation default.
    async fn set_tree(&self, tree: &CourseTree, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Drops the cached tree of a course.
    ///
    /// Called after any write that touches the course, its sections or content.
    async fn invalidate_course(&self, course_id: i64) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
