/// PostgreSQL-backed store
///
/// Thin adapter from the store traits to the model functions. Holds a cloned
/// `PgPool`, which is reference counted internally.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{ScoreStore, StoreHealth, StoreResult, TaskStore, UserStore};
use crate::db::pool::{get_pool_stats, health_check, PoolStats};
use crate::models::{
    daily_score::DailyScore,
    task::{DailyTaskCounts, NewTask, Task, TaskCounts},
    user::{CreateUser, User},
};

/// Store implementation over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrows the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        User::update_last_login(&self.pool, id).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner).await?)
    }

    async fn find_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id_and_owner(&self.pool, id, owner).await?)
    }

    async fn insert_task(&self, owner: Uuid, data: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, owner, data).await?)
    }

    async fn update_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        Ok(Task::save(&self.pool, task).await?)
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id, owner).await?)
    }

    async fn count_tasks(&self, owner: Uuid, as_of: NaiveDate) -> StoreResult<TaskCounts> {
        let counts = Task::count_as_of(&self.pool, owner, as_of).await?;
        debug!(user_id = %owner, %as_of, total = counts.total, completed = counts.completed, "Counted tasks");
        Ok(counts)
    }

    async fn count_tasks_in_range(
        &self,
        owner: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyTaskCounts>> {
        Ok(Task::count_per_day(&self.pool, owner, start, end).await?)
    }
}

#[async_trait]
impl ScoreStore for PgStore {
    async fn upsert_daily_score(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        score: i32,
        completed: i64,
        total: i64,
    ) -> StoreResult<()> {
        DailyScore::upsert(&self.pool, user_id, date, score, completed, total).await?;
        Ok(())
    }

    async fn get_daily_scores(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyScore>> {
        Ok(DailyScore::list_range(&self.pool, user_id, start, end).await?)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        Some(get_pool_stats(&self.pool))
    }
}
