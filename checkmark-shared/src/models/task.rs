/// Task model and database operations
///
/// A task is a to-do item owned by exactly one user. Every query that touches
/// an existing task filters by both `id` and `user_id`, so a task belonging to
/// someone else behaves exactly like a task that does not exist.
///
/// # State Machine
///
/// ```text
/// incomplete ⇄ complete
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description VARCHAR(1000),
///     done BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use checkmark_shared::models::task::{Task, CreateTask};
/// use checkmark_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     user_id: owner,
///     title: "buy milk".to_string(),
///     description: None,
///     done: false,
/// }).await?;
///
/// let toggled = Task::toggle_done_owned(&pool, task.id, owner).await?;
/// assert_eq!(toggled.map(|t| t.done), Some(true));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum title length (characters)
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum description length (characters)
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub user_id: Uuid,

    /// Title (non-blank)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Completion flag
    pub done: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    /// Owner (the creating user)
    pub user_id: Uuid,

    /// Title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial completion flag
    pub done: bool,
}

/// Replacement values for the mutable fields of a task
///
/// Owner and ID are not part of this type and can never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTask {
    /// New title
    pub title: String,

    /// New description (`None` clears it)
    pub description: Option<String>,

    /// New completion flag
    pub done: bool,
}

impl Task {
    /// Inserts a task owned by `data.user_id`
    ///
    /// # Errors
    ///
    /// Returns a foreign-key violation if the owner does not exist.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, done)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.done)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, only if it belongs to `user_id`
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, done, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task owned by `user_id`, oldest first
    pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, done, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Replaces title, description and done in one statement
    ///
    /// Returns `None` if no task with `id` is owned by `user_id`.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, done = $5, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.done)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Flips the completion flag in one statement
    ///
    /// Returns `None` if no task with `id` is owned by `user_id`.
    pub async fn toggle_done_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET done = NOT done, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, done, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task owned by `user_id`
    ///
    /// Returns true if a row was removed.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
