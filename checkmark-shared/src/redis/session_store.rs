/// Redis-backed session store
///
/// Each session is a JSON string under `session:{token_digest}`, written with
/// `SET ... EX ttl` so Redis expires it without any sweeper. Sessions survive
/// API restarts and are shared by every API instance pointing at the same
/// Redis.

use async_trait::async_trait;
use std::time::Duration;

use super::client::{RedisClient, RedisClientError};
use crate::auth::session::{SessionData, SessionError, SessionStore};

/// Key namespace for session entries
const KEY_PREFIX: &str = "session:";

impl From<RedisClientError> for SessionError {
    fn from(err: RedisClientError) -> Self {
        SessionError::Store(err.to_string())
    }
}

/// [`SessionStore`] over a [`RedisClient`]
#[derive(Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
}

impl RedisSessionStore {
    /// Wraps a connected client
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn key(digest: &str) -> String {
        format!("{}{}", KEY_PREFIX, digest)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, key: &str, data: &SessionData, ttl: Duration) -> Result<(), SessionError> {
        let payload = serde_json::to_string(data)?;
        // EX 0 is rejected by Redis
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.client.connection();

        let _: () = self
            .client
            .with_timeout(
                redis::cmd("SET")
                    .arg(Self::key(key))
                    .arg(payload)
                    .arg("EX")
                    .arg(seconds)
                    .query_async(&mut conn),
            )
            .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<SessionData>, SessionError> {
        let mut conn = self.client.connection();
        let payload: Option<String> = self
            .client
            .with_timeout(redis::cmd("GET").arg(Self::key(key)).query_async(&mut conn))
            .await?;

        match payload {
            Some(json) => {
                let data: SessionData = serde_json::from_str(&json)?;
                Ok(Some(data).filter(|d| !d.is_expired()))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.client.connection();
        let _: i64 = self
            .client
            .with_timeout(redis::cmd("DEL").arg(Self::key(key)).query_async(&mut conn))
            .await?;

        Ok(())
    }
}
