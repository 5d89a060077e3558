/// API route handlers, one module per resource
///
/// - `health`: service health
/// - `auth`: registration, login, token refresh, profile
/// - `tasks`: task CRUD
/// - `scores`: daily scores and reports

pub mod auth;
pub mod health;
pub mod scores;
pub mod tasks;
