use std::sync::Arc;

use common::{FixedWindowLimiter, TtlCache};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

/// Memoized capability lookups: `user:{id}:admin` / `user:{id}:judge` map to
/// the admin or judge row id, or `None` when the user lacks the capability.
pub type AccessCache = TtlCache<Option<i32>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub access_cache: Arc<AccessCache>,
    pub rate_limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let access_cache = Arc::new(TtlCache::new(config.cache.default_ttl()));
        Self {
            db,
            config,
            access_cache,
            rate_limiter: Arc::new(FixedWindowLimiter::new()),
        }
    }
}
