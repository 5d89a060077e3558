/// Storage abstractions
///
/// Route handlers and the score service never touch a connection pool or a
/// global collection directly. They talk to these traits, which are scoped by
/// owner id:
///
/// - [`UserStore`]: account rows
/// - [`TaskStore`]: task CRUD plus the counts the score calculator consumes
/// - [`ScoreStore`]: upsert/list of cached daily scores
/// - [`StoreHealth`]: liveness for the health endpoint
///
/// Two implementations exist: [`PgStore`] (PostgreSQL through sqlx) and
/// [`MemoryStore`] (process-local, used by tests and database-less runs).
///
/// # Example
///
/// ```
/// use habitpilot_shared::store::{MemoryStore, TaskStore};
/// use habitpilot_shared::models::task::NewTask;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), habitpilot_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
/// store.insert_task(owner, NewTask {
///     title: "Drink water".to_string(),
///     description: None,
///     due_date: None,
/// }).await?;
/// assert_eq!(store.list_tasks(owner).await?.len(), 1);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::db::pool::PoolStats;
use crate::models::{
    daily_score::DailyScore,
    task::{DailyTaskCounts, NewTask, Task, TaskCounts},
    user::{CreateUser, User},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (carries the field or constraint)
    #[error("Duplicate value for {0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some(constraint) if constraint.contains("email") => "email".to_string(),
                    Some(constraint) => constraint.to_string(),
                    None => "unique key".to_string(),
                };
                return StoreError::Conflict(field);
            }
        }

        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User account storage
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user; fails with [`StoreError::Conflict`] on a duplicate email
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Finds a user by email (case-insensitive)
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Finds a user by ID
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Stamps the last login time
    async fn record_login(&self, id: Uuid) -> StoreResult<()>;
}

/// Task storage, scoped by owner
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists the owner's tasks, newest first
    async fn list_tasks(&self, owner: Uuid) -> StoreResult<Vec<Task>>;

    /// Finds one of the owner's tasks
    async fn find_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// Inserts a new task for the owner
    async fn insert_task(&self, owner: Uuid, data: NewTask) -> StoreResult<Task>;

    /// Persists a whole, already patched task
    ///
    /// Returns None if the task no longer exists for `task.user_id`.
    async fn update_task(&self, task: &Task) -> StoreResult<Option<Task>>;

    /// Deletes one of the owner's tasks; returns true if it existed
    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    /// Counts tasks created on or before `as_of`
    async fn count_tasks(&self, owner: Uuid, as_of: NaiveDate) -> StoreResult<TaskCounts>;

    /// Counts tasks for every day in `[start, end]`, oldest first
    async fn count_tasks_in_range(
        &self,
        owner: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyTaskCounts>>;
}

/// Daily score storage
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Inserts or replaces the score for `(user_id, date)`
    async fn upsert_daily_score(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        score: i32,
        completed: i64,
        total: i64,
    ) -> StoreResult<()>;

    /// Lists scores with `start <= date <= end`, newest first
    async fn get_daily_scores(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyScore>>;
}

/// Store liveness information
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Round-trips to the backing store
    async fn ping(&self) -> StoreResult<()>;

    /// Connection pool statistics, if the store has a pool
    fn pool_stats(&self) -> Option<PoolStats>;
}
