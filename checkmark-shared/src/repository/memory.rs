/// In-memory repository
///
/// Mirrors the PostgreSQL schema's guarantees: unique emails, tasks must
/// reference an existing user, deleting a user cascades to their tasks, and
/// tasks list in insertion order. Used by the test suites and by
/// `DATABASE_URL=memory` for local runs without a database.
///
/// # Example
///
/// ```
/// use checkmark_shared::models::CreateUser;
/// use checkmark_shared::repository::{MemoryRepository, UserRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = MemoryRepository::new();
/// let user = repo.create(CreateUser {
///     email: "a@x.com".to_string(),
///     password_hash: "hash".to_string(),
///     display_name: "A".to_string(),
/// }).await?;
///
/// assert!(repo.exists_by_email("a@x.com").await?);
/// assert_eq!(repo.find_by_id(user.id).await?.map(|u| u.email), Some("a@x.com".to_string()));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{CreateTask, CreateUser, Task, UpdateTask, User};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    tasks: Vec<Task>,
}

/// Mutex-guarded user and task tables
#[derive(Debug)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
    available: AtomicBool,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an outage: while unavailable every call fails with
    /// [`RepositoryError::Unavailable`]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Deletes a user and, like `ON DELETE CASCADE`, every task they own
    pub fn delete_user(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let removed = state.users.remove(&id).is_some();
        state.tasks.retain(|task| task.user_id != id);
        Ok(removed)
    }

    /// Total number of stored tasks across all owners
    pub fn task_count(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.tasks.len())
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }

        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
    }
}

impl MemoryState {
    fn owned_task_mut(&mut self, id: Uuid, owner_id: Uuid) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id && task.user_id == owner_id)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create(&self, data: CreateUser) -> RepositoryResult<User> {
        let mut state = self.lock()?;

        if state.users.values().any(|u| u.email == data.email) {
            return Err(RepositoryError::Conflict("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            display_name: data.display_name,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        Ok(self.lock()?.users.values().any(|u| u.email == email))
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn create(&self, data: CreateTask) -> RepositoryResult<Task> {
        let mut state = self.lock()?;

        if !state.users.contains_key(&data.user_id) {
            return Err(RepositoryError::Conflict("tasks_user_id_fkey".to_string()));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            done: data.done,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<Option<Task>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .find(|task| task.id == id && task.user_id == owner_id)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> RepositoryResult<Vec<Task>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .filter(|task| task.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> RepositoryResult<Option<Task>> {
        let mut state = self.lock()?;

        Ok(state.owned_task_mut(id, owner_id).map(|task| {
            task.title = data.title;
            task.description = data.description;
            task.done = data.done;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn toggle_done_owned(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<Option<Task>> {
        let mut state = self.lock()?;

        Ok(state.owned_task_mut(id, owner_id).map(|task| {
            task.done = !task.done;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.tasks.len();
        state
            .tasks
            .retain(|task| !(task.id == id && task.user_id == owner_id));

        Ok(state.tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(repo: &MemoryRepository, email: &str) -> User {
        UserRepository::create(
            repo,
            CreateUser {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                display_name: email.to_string(),
            },
        )
        .await
        .unwrap()
    }

    async fn task(repo: &MemoryRepository, owner: Uuid, title: &str) -> Task {
        TaskRepository::create(
            repo,
            CreateTask {
                user_id: owner,
                title: title.to_string(),
                description: None,
                done: false,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = MemoryRepository::new();
        user(&repo, "a@x.com").await;

        let err = UserRepository::create(
            &repo,
            CreateUser {
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                display_name: "A".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_duplicate_email());
    }

    #[tokio::test]
    async fn test_task_requires_existing_owner() {
        let repo = MemoryRepository::new();
        let err = TaskRepository::create(
            &repo,
            CreateTask {
                user_id: Uuid::new_v4(),
                title: "orphan".to_string(),
                description: None,
                done: false,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(!err.is_duplicate_email());
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let repo = MemoryRepository::new();
        let alice = user(&repo, "alice@x.com").await;
        let bob = user(&repo, "bob@x.com").await;
        let t = task(&repo, alice.id, "alice's").await;

        assert!(repo.find_by_id_and_owner(t.id, bob.id).await.unwrap().is_none());
        assert!(repo.toggle_done_owned(t.id, bob.id).await.unwrap().is_none());
        assert!(!repo.delete_owned(t.id, bob.id).await.unwrap());
        assert!(repo.list_by_owner(bob.id).await.unwrap().is_empty());

        let found = repo.find_by_id_and_owner(t.id, alice.id).await.unwrap();
        assert_eq!(found, Some(t));
    }

    #[tokio::test]
    async fn test_list_in_insertion_order() {
        let repo = MemoryRepository::new();
        let alice = user(&repo, "alice@x.com").await;
        for title in ["one", "two", "three"] {
            task(&repo, alice.id, title).await;
        }

        let titles: Vec<String> = repo
            .list_by_owner(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let repo = MemoryRepository::new();
        let alice = user(&repo, "alice@x.com").await;
        let bob = user(&repo, "bob@x.com").await;
        task(&repo, alice.id, "a1").await;
        task(&repo, alice.id, "a2").await;
        task(&repo, bob.id, "b1").await;

        assert!(repo.delete_user(alice.id).unwrap());

        assert_eq!(repo.task_count().unwrap(), 1);
        assert!(repo.find_by_id(alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = MemoryRepository::new();
        repo.set_available(false);

        assert!(matches!(
            repo.health_check().await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(repo.find_by_email("a@x.com").await.is_err());

        repo.set_available(true);
        assert!(repo.health_check().await.is_ok());
    }
}
