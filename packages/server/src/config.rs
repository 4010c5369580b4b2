use common::{CacheConfig, RateLimitConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Username granted the admin capability at startup and on registration.
    #[serde(default)]
    pub bootstrap_admin: Option<String>,
}

fn default_token_ttl_hours() -> i64 {
    168
}

/// Inclusive bounds for a judge's score.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct JudgingConfig {
    #[serde(default = "default_min_score")]
    pub min_score: i32,
    #[serde(default = "default_max_score")]
    pub max_score: i32,
}

fn default_min_score() -> i32 {
    1
}
fn default_max_score() -> i32 {
    10
}

impl Default for JudgingConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_score: default_max_score(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub judging: JudgingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., JUDGING__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("JUDGING")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.judging.min_score > self.judging.max_score {
            return Err(ConfigError::Message(format!(
                "judging.min_score ({}) must not exceed judging.max_score ({})",
                self.judging.min_score, self.judging.max_score
            )));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must be set".into()));
        }
        Ok(())
    }
}
