/// Owner-scoped task operations
///
/// Every method takes the ID of the already-authenticated caller and passes
/// it down to the repository, which filters on it. A task owned by someone
/// else is reported as [`TaskError::TaskNotFound`], the same as a task that
/// never existed.
///
/// # Example
///
/// ```
/// use checkmark_shared::repository::MemoryRepository;
/// use checkmark_shared::services::tasks::{TaskInput, TaskService};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # async fn example(owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let repo = Arc::new(MemoryRepository::new());
/// let tasks = TaskService::new(repo.clone(), repo);
///
/// let task = tasks.create(owner, TaskInput::titled("buy milk")).await?;
/// let toggled = tasks.toggle(task.id, owner).await?;
/// assert!(toggled.done);
/// # Ok(())
/// # }
/// ```

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::{CreateTask, Task, UpdateTask};
use crate::repository::{RepositoryError, TaskRepository, UserRepository};

/// Task service errors
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Malformed task input
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The caller's account no longer exists
    #[error("User not found")]
    UserNotFound,

    /// No task with this ID is owned by the caller
    #[error("Task not found")]
    TaskNotFound,

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Title, description and completion flag of a task
///
/// Used both for creation and for full replacement on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct TaskInput {
    /// Title; surrounding whitespace is dropped
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    /// Optional description; blank means none
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    /// Completion flag
    #[serde(default)]
    pub done: bool,
}

impl TaskInput {
    /// An incomplete task with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Trims the title and collapses a blank description to `None`
    pub fn normalized(self) -> Self {
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Self {
            title: self.title.trim().to_string(),
            description,
            done: self.done,
        }
    }
}

/// CRUD over a user's own tasks
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
}

impl TaskService {
    /// Creates a service over the given repositories
    pub fn new(tasks: Arc<dyn TaskRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { tasks, users }
    }

    /// Creates a task owned by `user_id`
    ///
    /// # Errors
    ///
    /// [`TaskError::UserNotFound`] if `user_id` has no account, including when
    /// the account disappears between the check and the insert.
    pub async fn create(&self, user_id: Uuid, input: TaskInput) -> Result<Task, TaskError> {
        let input = input.normalized();
        input.validate()?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(TaskError::UserNotFound);
        }

        let task = self
            .tasks
            .create(CreateTask {
                user_id,
                title: input.title,
                description: input.description,
                done: input.done,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => TaskError::UserNotFound,
                other => TaskError::Repository(other),
            })?;

        info!(task_id = %task.id, user_id = %user_id, "Task created");
        Ok(task)
    }

    /// All tasks owned by `user_id`, oldest first
    pub async fn list_all(&self, user_id: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_by_owner(user_id).await?)
    }

    /// Task `task_id`, if owned by `user_id`
    pub async fn get_by_id(&self, task_id: Uuid, user_id: Uuid) -> Result<Task, TaskError> {
        self.tasks
            .find_by_id_and_owner(task_id, user_id)
            .await?
            .ok_or(TaskError::TaskNotFound)
    }

    /// Replaces title, description and done of task `task_id`
    pub async fn update(
        &self,
        task_id: Uuid,
        user_id: Uuid,
        input: TaskInput,
    ) -> Result<Task, TaskError> {
        let input = input.normalized();
        input.validate()?;

        let task = self
            .tasks
            .update_owned(
                task_id,
                user_id,
                UpdateTask {
                    title: input.title,
                    description: input.description,
                    done: input.done,
                },
            )
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        info!(task_id = %task.id, user_id = %user_id, "Task updated");
        Ok(task)
    }

    /// Flips the completion flag of task `task_id`
    pub async fn toggle(&self, task_id: Uuid, user_id: Uuid) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .toggle_done_owned(task_id, user_id)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        info!(task_id = %task.id, user_id = %user_id, done = task.done, "Task toggled");
        Ok(task)
    }

    /// Permanently removes task `task_id`
    pub async fn delete(&self, task_id: Uuid, user_id: Uuid) -> Result<(), TaskError> {
        if !self.tasks.delete_owned(task_id, user_id).await? {
            return Err(TaskError::TaskNotFound);
        }

        info!(task_id = %task_id, user_id = %user_id, "Task deleted");
        Ok(())
    }
}
