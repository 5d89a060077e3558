/// In-memory store
///
/// Implements every store trait over process-local maps behind a tokio
/// `RwLock`. Semantics mirror [`super::PgStore`]: owner scoping, unique
/// emails, newest-first task lists and upsert-by-`(user, date)` scores.
///
/// Cloning a `MemoryStore` shares the same data.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ScoreStore, StoreError, StoreHealth, StoreResult, TaskStore, UserStore};
use crate::db::pool::PoolStats;
use crate::models::{
    daily_score::DailyScore,
    task::{DailyTaskCounts, NewTask, Task, TaskCounts},
    user::{normalize_email, CreateUser, User},
};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
    scores: BTreeMap<(Uuid, NaiveDate), DailyScore>,
}

impl Inner {
    fn counts_as_of(&self, owner: Uuid, as_of: NaiveDate) -> TaskCounts {
        self.tasks
            .values()
            .filter(|t| t.user_id == owner && t.created_at.date_naive() <= as_of)
            .fold(TaskCounts::default(), |mut acc, t| {
                acc.total += 1;
                if t.completed {
                    acc.completed += 1;
                }
                acc
            })
    }
}

/// Process-local store implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task with an explicit creation time
    ///
    /// Lets callers seed history that predates today.
    pub async fn insert_task_at(
        &self,
        owner: Uuid,
        data: NewTask,
        created_at: DateTime<Utc>,
    ) -> Task {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            title: data.title.trim().to_string(),
            description: data.description,
            completed: false,
            due_date: data.due_date,
            created_at,
            updated_at: created_at,
        };

        self.inner.write().await.tasks.insert(task.id, task.clone());
        task
    }

    /// Number of stored score rows for a user
    pub async fn score_rows(&self, user_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .scores
            .keys()
            .filter(|(owner, _)| *owner == user_id)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let email = normalize_email(&data.email);
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: data.password_hash,
            name: data.name,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.get(&id).filter(|t| t.user_id == owner).cloned())
    }

    async fn insert_task(&self, owner: Uuid, data: NewTask) -> StoreResult<Task> {
        Ok(self.insert_task_at(owner, data, Utc::now()).await)
    }

    async fn update_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&task.id) {
            Some(stored) if stored.user_id == task.user_id => {
                stored.title = task.title.clone();
                stored.description = task.description.clone();
                stored.completed = task.completed;
                stored.due_date = task.due_date;
                stored.updated_at = task.updated_at;
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let owned = inner.tasks.get(&id).is_some_and(|t| t.user_id == owner);
        if owned {
            inner.tasks.remove(&id);
        }
        Ok(owned)
    }

    async fn count_tasks(&self, owner: Uuid, as_of: NaiveDate) -> StoreResult<TaskCounts> {
        Ok(self.inner.read().await.counts_as_of(owner, as_of))
    }

    async fn count_tasks_in_range(
        &self,
        owner: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyTaskCounts>> {
        let inner = self.inner.read().await;
        let counts = start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|date| {
                let counts = inner.counts_as_of(owner, date);
                DailyTaskCounts {
                    date,
                    total: counts.total,
                    completed: counts.completed,
                }
            })
            .collect();
        Ok(counts)
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn upsert_daily_score(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        score: i32,
        completed: i64,
        total: i64,
    ) -> StoreResult<()> {
        let row = DailyScore {
            user_id,
            date,
            score,
            tasks_completed: completed,
            total_tasks: total,
            created_at: Utc::now(),
        };
        self.inner.write().await.scores.insert((user_id, date), row);
        Ok(())
    }

    async fn get_daily_scores(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyScore>> {
        if start > end {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        let rows = inner
            .scores
            .range((user_id, start)..=(user_id, end))
            .rev()
            .map(|(_, row)| row.clone())
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        None
    }
}
