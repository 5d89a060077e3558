//! # HabitPilot Shared Library
//!
//! Domain types, storage and business logic used by the HabitPilot API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT issuance and bearer authentication
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Database models (users, tasks, daily scores)
//! - `score`: Score calculation and the score service
//! - `store`: Storage traits with PostgreSQL and in-memory implementations

pub mod auth;
pub mod db;
pub mod models;
pub mod score;
pub mod store;

/// Current version of the HabitPilot shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
