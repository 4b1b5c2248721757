//! # FieldTask Shared Library
//!
//! Domain types, persistence and business logic used by the FieldTask API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Users and tasks, with their PostgreSQL queries
//! - `store`: Persistence traits plus PostgreSQL and in-memory stores
//! - `db`: Connection pool and embedded migrations
//! - `auth`: Credential hashing, Basic decoding, session tokens, request
//!   gates and task visibility
//! - `services`: User, login, task, notification and health services

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the FieldTask shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
