//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::CourseTree;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache for assembled course trees, stored as JSON.
///
/// Uses `ConnectionManager` for connection reuse. All operations are
/// fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "course-tree:".to_string(),
        })
    }

    fn build_key(&self, course_id: i64) -> String {
        format!("{}{}", self.key_prefix, course_id)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_tree(&self, course_id: i64) -> CacheResult<Option<CourseTree>> {
        let key = self.build_key(course_id);
        let mut conn = self.client.clone();

        let raw = match conn.get::<_, Option<String>>(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(course_id, "Redis GET error: {}", e);
                return Ok(None);
            }
        };

        let Some(raw) = raw else {
            debug!(course_id, "Cache MISS");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(tree) => {
                debug!(course_id, "Cache HIT");
                Ok(Some(tree))
            }
            Err(e) => {
                warn!(course_id, "Discarding undecodable cache entry: {}", e);
                let _ = conn.del::<_, i32>(&key).await;
                Ok(None)
            }
        }
    }

    async fn set_tree(&self, tree: &CourseTree, ttl: Option<u64>) -> CacheResult<()> {
        let course_id = tree.course.id;
        let key = self.build_key(course_id);
        let ttl_seconds = ttl.unwrap_or(self.default_ttl);

        let payload = match serde_json::to_string(tree) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(course_id, "Failed to encode course tree: {}", e);
                return Ok(());
            }
        };

        let mut conn = self.client.clone();
        match conn.set_ex::<_, _, ()>(&key, payload, ttl_seconds).await {
            Ok(_) => debug!(course_id, ttl_seconds, "Cache SET"),
            Err(e) => warn!(course_id, "Redis SET error: {}", e),
        }

        Ok(())
    }

    async fn invalidate_course(&self, course_id: i64) -> CacheResult<()> {
        let key = self.build_key(course_id);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) if deleted > 0 => debug!(course_id, "Cache INVALIDATE"),
            Ok(_) => {}
            Err(e) => warn!(course_id, "Redis DEL error: {}", e),
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
