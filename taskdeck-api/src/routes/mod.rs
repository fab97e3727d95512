/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `tasks`: The task resource, always scoped to the authenticated user
pub mod auth;
pub mod health;
pub mod tasks;
