/// Session binding between an opaque client-held token and a user
///
/// A login produces a random token that the client keeps (as a cookie).
/// The server only ever stores the SHA-256 digest of the token, mapped to
/// the [`SessionData`] it authenticates.
///
/// # Token Format
///
/// `cms_` prefix + 43 random base62 characters (~256 bits of entropy).
///
/// # Example
///
/// ```
/// use checkmark_shared::auth::session::{MemorySessionStore, SessionManager};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sessions = SessionManager::new(Arc::new(MemorySessionStore::new()), Duration::from_secs(1800));
///
/// let token = sessions.establish(Uuid::new_v4(), "Ada").await?;
/// let session = sessions.resolve(&token).await?.expect("session exists");
/// assert_eq!(session.display_name, "Ada");
///
/// sessions.invalidate(&token).await?;
/// assert!(sessions.resolve(&token).await?.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token prefix
const TOKEN_PREFIX: &str = "cms_";

/// Length of the random part of a session token (characters)
const TOKEN_RANDOM_LENGTH: usize = 43;

/// Total length of a session token
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Errors raised by a session store
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backing store could not be reached or rejected the command
    #[error("Session store error: {0}")]
    Store(String),

    /// A stored session could not be encoded or decoded
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What a session token resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated user
    pub user_id: Uuid,

    /// Display name shown in page headers
    pub display_name: String,

    /// When the session was established
    pub created_at: DateTime<Utc>,

    /// When the session stops resolving
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    /// Whether the session has passed its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Storage for session bindings, keyed by token digest
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `data` under `key` for `ttl`
    async fn put(&self, key: &str, data: &SessionData, ttl: Duration) -> Result<(), SessionError>;

    /// Loads the session under `key`; expired or missing sessions are `None`
    async fn get(&self, key: &str) -> Result<Option<SessionData>, SessionError>;

    /// Deletes the session under `key` (no-op when absent)
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Process-local session store
///
/// Expired entries are evicted when read and swept on every `put`.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl MemorySessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, key: &str, data: &SessionData, _ttl: Duration) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| !session.is_expired());
        sessions.insert(key.to_string(), data.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<SessionData>, SessionError> {
        let found = self.sessions.read().await.get(key).cloned();

        match found {
            Some(data) if data.is_expired() => {
                self.sessions.write().await.remove(key);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}

/// Issues, resolves and invalidates session tokens
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a manager over `store` issuing sessions that live for `ttl`
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Binds a fresh token to `user_id` and returns the plaintext token
    pub async fn establish(&self, user_id: Uuid, display_name: &str) -> Result<String, SessionError> {
        let token = generate_session_token();
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| SessionError::Store(format!("Invalid session TTL: {}", e)))?;

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| SessionError::Store("Session TTL out of range".to_string()))?;

        let data = SessionData {
            user_id,
            display_name: display_name.to_string(),
            created_at: now,
            expires_at,
        };

        self.store.put(&hash_session_token(&token), &data, self.ttl).await?;
        tracing::debug!(user_id = %user_id, "Session established");

        Ok(token)
    }

    /// Resolves a token to its session, if it is well-formed, known and unexpired
    pub async fn resolve(&self, token: &str) -> Result<Option<SessionData>, SessionError> {
        if !validate_session_token_format(token) {
            return Ok(None);
        }

        let session = self.store.get(&hash_session_token(token)).await?;
        Ok(session.filter(|s| !s.is_expired()))
    }

    /// Drops the binding for `token`
    pub async fn invalidate(&self, token: &str) -> Result<(), SessionError> {
        if !validate_session_token_format(token) {
            return Ok(());
        }

        self.store.remove(&hash_session_token(token)).await
    }
}

/// Generates a new random session token
pub fn generate_session_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format!("{}{}", TOKEN_PREFIX, random_part)
}

/// Hex-encoded SHA-256 digest of a token, used as the store key
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Checks prefix, length and alphabet of a token
pub fn validate_session_token_format(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: Duration) -> (SessionManager, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        (SessionManager::new(store.clone(), ttl), store)
    }

    #[test]
    fn test_generate_session_token_format() {
        let token = generate_session_token();
        assert!(token.starts_with("cms_"));
        assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
        assert!(validate_session_token_format(&token));
    }

    #[test]
    fn test_generate_session_token_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn test_hash_session_token_deterministic() {
        let token = generate_session_token();
        let hash = hash_session_token(&token);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_session_token(&token));
        assert_ne!(hash, token);
    }

    #[test]
    fn test_validate_session_token_format_rejects() {
        assert!(!validate_session_token_format(""));
        assert!(!validate_session_token_format("cms_short"));
        assert!(!validate_session_token_format(&format!("xyz_{}", "a".repeat(43))));
        assert!(!validate_session_token_format(&format!("cms_{}!", "a".repeat(42))));
    }

    #[tokio::test]
    async fn test_establish_and_resolve() {
        let (sessions, _) = manager(Duration::from_secs(60));
        let user_id = Uuid::new_v4();

        let token = sessions.establish(user_id, "Ada").await.unwrap();
        let session = sessions.resolve(&token).await.unwrap().unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.display_name, "Ada");
        assert!(session.expires_at > session.created_at);
    }

    #[tokio::test]
    async fn test_store_never_holds_plaintext_token() {
        let (sessions, store) = manager(Duration::from_secs(60));
        let token = sessions.establish(Uuid::new_v4(), "Ada").await.unwrap();

        assert!(store.get(&token).await.unwrap().is_none());
        assert!(store.get(&hash_session_token(&token)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_tokens_resolve_to_none() {
        let (sessions, _) = manager(Duration::from_secs(60));

        assert!(sessions.resolve(&generate_session_token()).await.unwrap().is_none());
        assert!(sessions.resolve("garbage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (sessions, store) = manager(Duration::from_secs(60));
        let token = sessions.establish(Uuid::new_v4(), "Ada").await.unwrap();

        sessions.invalidate(&token).await.unwrap();

        assert!(sessions.resolve(&token).await.unwrap().is_none());
        assert!(store.is_empty().await);

        // Invalidating twice is harmless
        sessions.invalidate(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let (sessions, store) = manager(Duration::ZERO);
        let token = sessions.establish(Uuid::new_v4(), "Ada").await.unwrap();
        assert_eq!(store.len().await, 1);

        assert!(sessions.resolve(&token).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_sweeps_expired_sessions() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        let session = |expires_at| SessionData {
            user_id: Uuid::new_v4(),
            display_name: "Ada".to_string(),
            created_at: now,
            expires_at,
        };

        for i in 0..100 {
            let expired = session(now - chrono::Duration::seconds(1));
            store
                .put(&format!("stale-{}", i), &expired, Duration::from_secs(1))
                .await
                .unwrap();
        }
        assert_eq!(store.len().await, 1);

        let live = session(now + chrono::Duration::seconds(60));
        store.put("live", &live, Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("live").await.unwrap(), Some(live));
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_an_error() {
        let (sessions, store) = manager(Duration::from_secs(9_000_000_000_000));

        let err = sessions.establish(Uuid::new_v4(), "Ada").await.unwrap_err();
        assert!(matches!(err, SessionError::Store(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (sessions, _) = manager(Duration::from_secs(60));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let alice_token = sessions.establish(alice, "Alice").await.unwrap();
        let bob_token = sessions.establish(bob, "Bob").await.unwrap();
        sessions.invalidate(&alice_token).await.unwrap();

        let session = sessions.resolve(&bob_token).await.unwrap().unwrap();
        assert_eq!(session.user_id, bob);
    }
}
