/// Authentication primitives for Checkmark
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing behind the `CredentialHasher` trait
/// - [`session`]: Opaque session tokens and the stores that bind them to users
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, per-hash random salt, constant-time verify
/// - **Session Tokens**: 256-bit random tokens, stored only as SHA-256 digests
///
/// # Example
///
/// ```no_run
/// use checkmark_shared::auth::password::{Argon2Hasher, CredentialHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Argon2Hasher::default();
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod session;
