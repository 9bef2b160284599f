use std::env;
use std::fmt;
use std::str::FromStr;

use secrecy::Secret;
use validator::Validate;

/// Startup configuration error naming the offending variable.
#[derive(Debug)]
pub struct ConfigError {
    pub key: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration for {}: {}", self.key, self.reason)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Validate)]
pub struct PoolConfig {
    #[validate(range(min = 1))]
    pub max_connections: u32,
    pub min_connections: u32,
    #[validate(range(min = 1))]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Validate)]
pub struct RetryConfig {
    #[validate(range(min = 1, max = 10))]
    pub attempts: u32,
    #[validate(range(min = 1, max = 30_000))]
    pub delay_ms: u64,
    #[validate(range(min = 1.0, max = 10.0))]
    pub backoff: f64,
}

/// Rate limit for the CSV export endpoint
#[derive(Debug, Clone, Validate)]
pub struct RateLimitConfig {
    #[validate(range(min = 1))]
    pub seconds_per_request: u64,
    #[validate(range(min = 1))]
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// `EXPORT_SECONDS_PER_REQUEST` is the replenish interval, not a rate.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            seconds_per_request: env_or("EXPORT_SECONDS_PER_REQUEST", 1)?,
            burst_size: env_or("EXPORT_RATE_BURST", 5)?,
        })
    }
}

#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    pub database_url: Secret<String>,
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub cors_allowed_origins: String,
    #[validate(nested)]
    pub pool: PoolConfig,
    #[validate(nested)]
    pub retry: RetryConfig,
    #[validate(nested)]
    pub export_rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Read configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError {
            key: "DATABASE_URL".to_string(),
            reason: "must be set".to_string(),
        })?;

        let config = Self {
            database_url: Secret::new(database_url),
            host: env_or("SERVER_HOST", "0.0.0.0".to_string())?,
            port: env_or("SERVER_PORT", 8080)?,
            cors_allowed_origins: env_or(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:3000".to_string(),
            )?,
            pool: PoolConfig {
                max_connections: env_or("DB_MAX_CONNECTIONS", 20)?,
                min_connections: env_or("DB_MIN_CONNECTIONS", 5)?,
                acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            },
            retry: RetryConfig {
                attempts: env_or("RETRY_ATTEMPTS", 3)?,
                delay_ms: env_or("RETRY_DELAY_MS", 500)?,
                backoff: env_or("RETRY_BACKOFF", 2.0)?,
            },
            export_rate_limit: RateLimitConfig::from_env()?,
        };

        config.validate().map_err(|e| ConfigError {
            key: "config".to_string(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
