/// JSON API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `accounts`: Signup
/// - `sessions`: Login, logout, current session
/// - `tasks`: Owner-scoped task CRUD

pub mod accounts;
pub mod health;
pub mod sessions;
pub mod tasks;
