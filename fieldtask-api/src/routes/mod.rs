/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login with Basic credentials
/// - `users`: User creation (managers only)
/// - `tasks`: Task creation and listing

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

/// Timestamp layout used in response bodies
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
