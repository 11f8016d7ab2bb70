/// Persistence ports for users and tasks
///
/// Services depend on these traits, never on a concrete database. Two
/// implementations are provided:
///
/// - [`postgres::PgRepository`]: PostgreSQL via sqlx
/// - [`memory::MemoryRepository`]: process-local maps, for tests and local runs
///
/// # Ownership
///
/// Every [`TaskRepository`] method that reads or writes an existing task takes
/// the owner's ID as a required argument. There is deliberately no way to load
/// a task by ID alone.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CreateTask, CreateUser, Task, UpdateTask, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Repository result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by a repository
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness or reference constraint rejected the write
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// The backing store cannot serve requests
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Maps constraint violations to [`RepositoryError::Conflict`]
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                return RepositoryError::Conflict(constraint.to_string());
            }
        }
        RepositoryError::Database(err)
    }

    /// Whether this is a violation of the unique email constraint
    pub fn is_duplicate_email(&self) -> bool {
        matches!(self, RepositoryError::Conflict(constraint) if constraint.contains("email"))
    }
}

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user with a freshly assigned ID
    async fn create(&self, data: CreateUser) -> RepositoryResult<User>;

    /// Looks up a user by ID
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Looks up a user by (normalized) email
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Checks whether an account with `email` exists
    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool>;

    /// Reports whether the store is reachable
    async fn health_check(&self) -> RepositoryResult<()>;
}

/// Owner-scoped task persistence
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a new task with a freshly assigned ID
    async fn create(&self, data: CreateTask) -> RepositoryResult<Task>;

    /// Finds task `id` if and only if it is owned by `owner_id`
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<Option<Task>>;

    /// Lists all tasks owned by `owner_id`, oldest first
    async fn list_by_owner(&self, owner_id: Uuid) -> RepositoryResult<Vec<Task>>;

    /// Atomically replaces the mutable fields of task `id` owned by `owner_id`
    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> RepositoryResult<Option<Task>>;

    /// Atomically flips the completion flag of task `id` owned by `owner_id`
    async fn toggle_done_owned(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<Option<Task>>;

    /// Atomically deletes task `id` owned by `owner_id`; true if it existed
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<bool>;
}
