/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Security headers
/// - Session cookie resolution

pub mod security;
pub mod session;
