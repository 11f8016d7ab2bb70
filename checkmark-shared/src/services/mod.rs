/// Business logic over the repository ports
///
/// - [`auth::AuthService`]: signup and login
/// - [`tasks::TaskService`]: owner-scoped task CRUD

pub mod auth;
pub mod tasks;

pub use auth::{AuthError, AuthService, LoginInput, SignupInput};
pub use tasks::{TaskError, TaskInput, TaskService};
