/// Password hashing module using Argon2id
///
/// This module wraps the one-way password hashing primitive behind the
/// [`CredentialHasher`] trait so services never touch Argon2 directly.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB) by default
/// - **Iterations**: 3 passes by default
/// - **Parallelism**: 4 lanes by default
/// - **Output**: 32-byte hash
/// - **Salt**: 16 random bytes per hash, from the OS RNG
///
/// # Example
///
/// ```
/// use checkmark_shared::auth::password::{Argon2Hasher, CredentialHasher, PasswordParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Argon2Hasher::new(PasswordParams::default());
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash)?);
/// assert!(!hasher.verify("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use serde::{Deserialize, Serialize};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// One-way, salted credential hashing
///
/// `verify` must compare in constant time. A wrong password is `Ok(false)`;
/// only a corrupt stored hash or an internal failure is an `Err`.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext password into an opaque string
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Verifies a plaintext password against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MB
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Argon2id implementation of [`CredentialHasher`]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: PasswordParams,
}

impl Argon2Hasher {
    /// Creates a hasher with the given cost parameters
    pub fn new(params: PasswordParams) -> Self {
        Self { params }
    }

    /// Returns the configured cost parameters
    pub fn params(&self) -> PasswordParams {
        self.params
    }

    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(self.params.memory_kib)
            .t_cost(self.params.iterations)
            .p_cost(self.params.parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(PasswordParams::default())
    }
}

impl CredentialHasher for Argon2Hasher {
    /// Produces a PHC string, e.g. `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

        // Cost parameters come from the PHC string, not from `self.params`
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::new(PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hash_password() {
        let hash = Argon2Hasher::default()
            .hash("test_password_123")
            .expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_uses_configured_params() {
        let hash = fast_hasher().hash("pw123456").expect("Hash should succeed");
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("same_password").expect("Hash 1 should succeed");
        let hash2 = hasher.hash("same_password").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct_password").expect("Hash should succeed");

        assert!(hasher.verify("correct_password", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct_password").expect("Hash should succeed");

        assert!(!hasher.verify("wrong_password", &hash).expect("Verify should succeed"));
        assert!(!hasher.verify("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_across_param_sets() {
        // A hash made with one cost setting still verifies after the setting changes
        let hash = fast_hasher().hash("pw123456").expect("Hash should succeed");
        let stronger = Argon2Hasher::new(PasswordParams {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        });

        assert!(stronger.verify("pw123456", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let hasher = fast_hasher();
        assert!(hasher.verify("password", "invalid_hash").is_err());
        assert!(hasher.verify("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let hasher = Argon2Hasher::new(PasswordParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(hasher.hash("pw123456"), Err(PasswordError::HashError(_))));
    }

    #[test]
    fn test_unicode_roundtrip() {
        let hasher = fast_hasher();
        for password in ["with spaces", "unicode-密码-パスワード"] {
            let hash = hasher.hash(password).expect("Hash should succeed");
            assert!(hasher.verify(password, &hash).expect("Verify should succeed"));
        }
    }
}
