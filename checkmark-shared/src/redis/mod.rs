/// Redis integration
///
/// Optional session persistence. When `REDIS_URL` is configured the API keeps
/// sessions here instead of in process memory:
///
/// ```text
/// login ──SET session:{sha256(token)} EX ttl──> Redis
/// request ──GET session:{sha256(token)}──────> Redis
/// logout ──DEL session:{sha256(token)}───────> Redis
/// ```

pub mod client;
pub mod session_store;

pub use client::{RedisClient, RedisClientError, RedisConfig};
pub use session_store::RedisSessionStore;
