/// Database models for HabitPilot
///
/// Each model owns its SQL. Higher layers reach them through the store traits
/// in [`crate::store`].
///
/// # Models
///
/// - `user`: User accounts
/// - `task`: Habits/tasks and the [`task::TaskPatch`] partial update
/// - `daily_score`: Cached per-day completion scores
///
/// # Example
///
/// ```no_run
/// use habitpilot_shared::models::user::{User, CreateUser};
/// use habitpilot_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let user = User::create(&pool, CreateUser::new("user@example.com", "$argon2id$...", "Jane")).await?;
/// # Ok(())
/// # }
/// ```

pub mod daily_score;
pub mod task;
pub mod user;
