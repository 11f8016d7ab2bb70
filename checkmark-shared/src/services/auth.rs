/// Signup and login flows
///
/// # Security
///
/// - Emails are trimmed and lowercased before every lookup and insert
/// - Passwords are hashed on the blocking pool, never logged
/// - An unknown email and a wrong password both yield
///   [`AuthError::InvalidCredentials`]; an unknown email still pays for one
///   hash verification so the two cases take the same time
/// - A taken email is reported as [`AuthError::DuplicateEmail`] at signup
///
/// # Example
///
/// ```
/// use checkmark_shared::auth::password::{Argon2Hasher, PasswordParams};
/// use checkmark_shared::repository::MemoryRepository;
/// use checkmark_shared::services::auth::{AuthService, LoginInput, SignupInput};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthService::new(
///     Arc::new(MemoryRepository::new()),
///     Arc::new(Argon2Hasher::new(PasswordParams::default())),
/// );
///
/// auth.signup(SignupInput {
///     email: "a@x.com".to_string(),
///     password: "pw123456".to_string(),
///     display_name: "A".to_string(),
/// }).await?;
///
/// let user = auth.login(LoginInput {
///     email: "a@x.com".to_string(),
///     password: "pw123456".to_string(),
/// }).await?;
/// assert_eq!(user.email, "a@x.com");
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::password::{CredentialHasher, PasswordError};
use crate::models::{CreateUser, User};
use crate::repository::{RepositoryError, UserRepository};

/// Plaintext verified against when the email is unknown
const DUMMY_PASSWORD: &str = "checkmark-dummy-password";

/// Auth service errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Malformed signup input
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// An account with this email already exists
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Hashing failure or corrupt stored hash
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Signup form / request body
///
/// Missing fields deserialize as empty and fail validation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupInput {
    /// Login email; bounded by the `users.email` column
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Name shown in the page header
    #[validate(length(min = 1, max = 100, message = "Display name must be 1 to 100 characters"))]
    pub display_name: String,
}

impl SignupInput {
    /// Normalizes the email and trims the display name
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
            display_name: self.display_name.trim().to_string(),
        }
    }
}

/// Login form / request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    /// Login email
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Trims and lowercases an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account creation and credential checks
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    /// Creates a service over `users`, hashing with `hasher`
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            users,
            hasher,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed email, a password shorter
    ///   than 6 characters, or a blank or over-long display name
    /// - [`AuthError::DuplicateEmail`] if the email is taken, including when a
    ///   concurrent signup wins the race to insert it
    pub async fn signup(&self, input: SignupInput) -> Result<User, AuthError> {
        let input = input.normalized();
        input.validate()?;

        if self.users.exists_by_email(&input.email).await? {
            debug!("Signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash(input.password).await?;

        let user = self
            .users
            .create(CreateUser {
                email: input.email,
                password_hash,
                display_name: input.display_name,
            })
            .await
            .map_err(|e| {
                if e.is_duplicate_email() {
                    AuthError::DuplicateEmail
                } else {
                    AuthError::Repository(e)
                }
            })?;

        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Checks credentials and returns the matching user
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] whether the email is unknown or the
    /// password is wrong.
    pub async fn login(&self, input: LoginInput) -> Result<User, AuthError> {
        let email = normalize_email(&input.email);

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let dummy = self.dummy_hash().await?;
                // Result ignored: only the elapsed time matters here
                let _ = self.verify(input.password, dummy).await;
                debug!("Login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.verify(input.password, user.password_hash.clone()).await? {
            debug!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Loads a user by ID
    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_id(user_id).await?)
    }

    async fn hash(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))?
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::VerifyError(e.to_string()))?
    }

    async fn dummy_hash(&self) -> Result<String, PasswordError> {
        self.dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_string()))
            .await
            .cloned()
    }
}
