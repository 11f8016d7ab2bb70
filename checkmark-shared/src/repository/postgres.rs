/// PostgreSQL repository backed by the model queries
///
/// # Example
///
/// ```no_run
/// use checkmark_shared::db::pool::{create_pool, DatabaseConfig};
/// use checkmark_shared::repository::{PgRepository, TaskRepository};
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let repo = PgRepository::new(pool);
///
/// let tasks = repo.list_by_owner(owner).await?;
/// println!("{} tasks", tasks.len());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::db::pool;
use crate::models::{CreateTask, CreateUser, Task, UpdateTask, User};

/// Repository over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create(&self, data: CreateUser) -> RepositoryResult<User> {
        User::create(&self.pool, data)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        Ok(User::exists_by_email(&self.pool, email).await?)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl TaskRepository for PgRepository {
    async fn create(&self, data: CreateTask) -> RepositoryResult<Task> {
        Task::create(&self.pool, data)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<Option<Task>> {
        Ok(Task::find_by_id_and_owner(&self.pool, id, owner_id).await?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> RepositoryResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> RepositoryResult<Option<Task>> {
        Task::update_owned(&self.pool, id, owner_id, data)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn toggle_done_owned(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<Option<Task>> {
        Ok(Task::toggle_done_owned(&self.pool, id, owner_id).await?)
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<bool> {
        Ok(Task::delete_owned(&self.pool, id, owner_id).await?)
    }
}
