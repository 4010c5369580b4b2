use std::time::Duration;

use serde::Deserialize;

/// Access cache configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// TTL used when a caller does not pass one. Default: 300.
    #[serde(default = "default_cache_ttl_secs")]
    pub default_ttl_secs: u64,
    /// TTL for memoized admin/judge lookups. Default: 60.
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    /// Interval of the background purge. Default: 60.
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_access_ttl_secs() -> u64 {
    60
}
fn default_cache_sweep_interval_secs() -> u64 {
    60
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl_secs(),
            access_ttl_secs: default_access_ttl_secs(),
            sweep_interval_secs: default_cache_sweep_interval_secs(),
        }
    }
}

/// Request rate limiting configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Whether requests are rate limited at all. Default: true.
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Length of a fixed window in milliseconds. Default: 60000.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Requests per window for callers without a valid token. Default: 60.
    #[serde(default = "default_anonymous_max")]
    pub anonymous_max: u32,
    /// Requests per window for authenticated callers. Default: 300.
    #[serde(default = "default_authenticated_max")]
    pub authenticated_max: u32,
    /// Interval of the background purge. Default: 300.
    #[serde(default = "default_limiter_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Read the client address from `X-Forwarded-For`/`X-Real-IP`. Only enable
    /// behind a proxy that overwrites these headers. Default: false.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_rate_limit_enabled() -> bool {
    true
}
fn default_window_ms() -> u64 {
    60_000
}
fn default_anonymous_max() -> u32 {
    60
}
fn default_authenticated_max() -> u32 {
    300
}
fn default_limiter_sweep_interval_secs() -> u64 {
    300
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            window_ms: default_window_ms(),
            anonymous_max: default_anonymous_max(),
            authenticated_max: default_authenticated_max(),
            sweep_interval_secs: default_limiter_sweep_interval_secs(),
            trust_proxy_headers: false,
        }
    }
}
