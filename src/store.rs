use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::{AppConfig, RetryConfig};

/// Upper bound on a single retry sleep, however large the backoff grows.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Retry schedule for transient store failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
            backoff: 2.0,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            attempts: cfg.attempts,
            delay: Duration::from_millis(cfg.delay_ms),
            backoff: cfg.backoff,
        }
    }
}

impl RetryPolicy {
    /// Only connection-level failures are worth another attempt.
    pub fn is_transient(err: &sqlx::Error) -> bool {
        matches!(
            err,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut
        )
    }

    /// Grow `delay` by the backoff factor, saturating at [`MAX_RETRY_DELAY`].
    pub fn next_delay(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.backoff)
            .map_or(MAX_RETRY_DELAY, |next| next.min(MAX_RETRY_DELAY))
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or attempts run out.
    pub async fn run<T, F, Fut>(&self, name: &'static str, mut op: F) -> Result<T, sqlx::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let attempts = self.attempts.max(1);
        let mut delay = self.delay.min(MAX_RETRY_DELAY);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && Self::is_transient(&err) => {
                    warn!(
                        operation = name,
                        attempt,
                        error = %err,
                        "Transient store error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = self.next_delay(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Connection pool plus the retry policy every query goes through.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    retry: RetryPolicy,
}

impl Store {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Configure connection pool with production-ready settings
    pub async fn connect(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .min_connections(config.pool.min_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(config.database_url.expose_secret())
            .await?;

        info!(
            max_connections = config.pool.max_connections,
            "PostgreSQL connection pool established"
        );

        Ok(Self::new(pool, RetryPolicy::from(&config.retry)))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}
