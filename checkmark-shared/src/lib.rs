//! # Checkmark Shared Library
//!
//! Domain types, persistence and business logic used by the Checkmark API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `repository`: User and task persistence ports (PostgreSQL, in-memory)
//! - `auth`: Password hashing and session binding
//! - `redis`: Redis client and session store
//! - `services`: Signup/login and owner-scoped task operations
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod redis;
pub mod repository;
pub mod services;

/// Current version of the Checkmark shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
