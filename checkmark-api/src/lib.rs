//! # Checkmark API Server Library
//!
//! This library provides the core functionality for the Checkmark API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and session resolution
//! - `pages`: Server-rendered HTML pages
//! - `routes`: JSON API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod routes;
