//! # Taskdeck Shared Library
//!
//! This crate contains the types and business logic shared between the
//! taskdeck API server and its tests: the authentication core, the task and
//! user table gateways, and the database layer.
//!
//! ## Module Organization
//!
//! - `auth`: credential extraction, the signed access-token codec, and the
//!   authenticator strategies
//! - `models`: table gateways for the `users` and `tasks` tables, plus the
//!   partial-update planner
//! - `db`: connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
