pub mod cache;
pub mod config;
pub mod hackathon_status;
pub mod rate_limit;
pub mod sanitize;

pub use cache::{CacheStats, TtlCache};
pub use config::{CacheConfig, RateLimitConfig};
pub use hackathon_status::HackathonStatus;
pub use rate_limit::{FixedWindowLimiter, RateLimitDecision};
pub use sanitize::{SanitizeError, SanitizeLimits, sanitize, sanitize_with};
