/// Redis connection wrapper
///
/// Holds a `redis::aio::ConnectionManager`, which reconnects on its own after
/// a dropped connection, together with the per-command timeout applied by
/// callers such as [`super::session_store::RedisSessionStore`].
///
/// # Example
///
/// ```no_run
/// use checkmark_shared::redis::client::{RedisClient, RedisConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RedisClient::new(RedisConfig::new("redis://localhost:6379")).await?;
/// assert!(client.ping().await?);
/// # Ok(())
/// # }
/// ```

use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use std::time::Duration;
use thiserror::Error;

/// Redis client errors
#[derive(Error, Debug)]
pub enum RedisClientError {
    /// Connection error
    #[error("Redis connection error: {0}")]
    ConnectionError(String),

    /// Command execution error
    #[error("Redis command error: {0}")]
    CommandError(String),

    /// Configuration error
    #[error("Redis configuration error: {0}")]
    ConfigError(String),

    /// Command did not complete within the configured timeout
    #[error("Redis command timed out after {0:?}")]
    Timeout(Duration),
}

impl From<RedisError> for RedisClientError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() {
            RedisClientError::ConnectionError(err.to_string())
        } else {
            RedisClientError::CommandError(err.to_string())
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, `redis://[username:password@]host:port[/db]`
    pub url: String,

    /// Upper bound on any single command
    pub command_timeout: Duration,
}

impl RedisConfig {
    /// Settings for `url` with a 5 second command timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            command_timeout: Duration::from_secs(5),
        }
    }
}

/// Cloneable Redis handle
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    command_timeout: Duration,
}

impl RedisClient {
    /// Connects to Redis
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the server is unreachable.
    pub async fn new(config: RedisConfig) -> Result<Self, RedisClientError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RedisClientError::ConfigError(format!("Invalid Redis URL: {}", e)))?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RedisClientError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!(url = %sanitize_url(&config.url), "Redis client connected");

        Ok(Self {
            manager,
            command_timeout: config.command_timeout,
        })
    }

    /// Sends PING; true when the server answers PONG
    pub async fn ping(&self) -> Result<bool, RedisClientError> {
        let mut conn = self.connection();
        let pong: String = self
            .with_timeout(redis::cmd("PING").query_async(&mut conn))
            .await?;

        Ok(pong == "PONG")
    }

    /// A connection handle sharing the managed multiplexed connection
    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Runs a Redis future under the command timeout
    pub async fn with_timeout<T, F>(&self, fut: F) -> Result<T, RedisClientError>
    where
        F: std::future::Future<Output = Result<T, RedisError>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| RedisClientError::Timeout(self.command_timeout))?
            .map_err(RedisClientError::from)
    }
}

/// Replaces credentials in a Redis URL with `***:***` for logging
pub fn sanitize_url(url: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > scheme_end {
            return format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..]);
        }
    }
    url.to_string()
}
