//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::CourseTree;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when Redis is not configured or its connection fails at startup.
/// Every read is a miss.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_tree(&self, _course_id: i64) -> CacheResult<Option<CourseTree>> {
        Ok(None)
    }

    async fn set_tree(&self, _tree: &CourseTree, _ttl: Option<u64>) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate_course(&self, _course_id: i64) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
