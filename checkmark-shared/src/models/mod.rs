/// Database models for Checkmark
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `task`: To-do items, each owned by one user
///
/// The functions on each model are raw PostgreSQL queries. Application code
/// reaches them through the [`crate::repository`] traits.

pub mod task;
pub mod user;

pub use task::{CreateTask, Task, UpdateTask};
pub use user::{CreateUser, User};
