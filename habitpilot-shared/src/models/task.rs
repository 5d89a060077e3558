/// Task (habit) model and database operations
///
/// A task belongs to exactly one user. Every query is scoped by `user_id`, so
/// a task id from another account behaves as if it did not exist.
///
/// # Partial updates
///
/// Edits arrive as a [`TaskPatch`]. The patch is applied to the loaded record
/// in memory and the whole record is written back with a single fixed UPDATE,
/// instead of assembling SQL from whichever fields happen to be present.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use habitpilot_shared::models::task::{NewTask, Task, TaskPatch};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let mut task = Task::create(&pool, user_id, NewTask {
///     title: "Morning stretch".to_string(),
///     description: None,
///     due_date: None,
/// }).await?;
///
/// let patch = TaskPatch { completed: Some(true), ..Default::default() };
/// patch.apply(&mut task);
/// Task::save(&pool, &task).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user-defined habit or one-off action tracked for completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owner of the task
    pub user_id: Uuid,

    /// Short title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Whether the task is currently marked done
    pub completed: bool,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// Title (trimmed on insert)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Set of optional field updates for a task
///
/// Absent fields are left untouched. For nullable columns the outer `Option`
/// says whether the field is updated and the inner one carries the new value,
/// so `{"description": null}` clears the description while omitting the key
/// keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,

    /// New description (`Some(None)` clears it)
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    /// New completion flag
    #[serde(default)]
    pub completed: Option<bool>,

    /// New due date (`Some(None)` clears it)
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Maps a present JSON value (including `null`) to `Some`
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    /// True when the patch carries no field updates
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
    }

    /// Applies the patch to a loaded task
    ///
    /// Titles are trimmed. `updated_at` is bumped whenever at least one field
    /// is present. Returns true if anything was applied.
    pub fn apply(&self, task: &mut Task) -> bool {
        if self.is_empty() {
            return false;
        }

        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }

        task.updated_at = Utc::now();
        true
    }
}

/// Total and completed task counts for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskCounts {
    /// Number of tasks
    pub total: i64,

    /// Number of tasks marked completed
    pub completed: i64,
}

/// Task counts for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyTaskCounts {
    /// Calendar day
    pub date: NaiveDate,

    /// Tasks created on or before `date`
    pub total: i64,

    /// Of those, how many are completed
    pub completed: i64,
}

impl Task {
    /// Creates a new, not yet completed task
    pub async fn create(pool: &PgPool, user_id: Uuid, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, completed, due_date, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.title.trim())
        .bind(data.description)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID within the owner's tasks
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, completed, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists the owner's tasks, newest first
    pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, completed, due_date, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Writes every mutable field of `task` back to its row
    ///
    /// Returns None if the row no longer exists for that owner.
    pub async fn save(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        let saved = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                completed = $5,
                due_date = $6,
                updated_at = $7
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, completed, due_date, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.due_date)
        .bind(task.updated_at)
        .fetch_optional(pool)
        .await?;

        Ok(saved)
    }

    /// Deletes a task within the owner's tasks
    ///
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the owner's tasks created on or before `as_of` (UTC)
    pub async fn count_as_of(
        pool: &PgPool,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<TaskCounts, sqlx::Error> {
        let counts = sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE completed) AS completed
            FROM tasks
            WHERE user_id = $1
              AND (created_at AT TIME ZONE 'UTC')::date <= $2
            "#,
        )
        .bind(user_id)
        .bind(as_of)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }

    /// Counts the owner's tasks for every day in `[start, end]`, oldest first
    pub async fn count_per_day(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyTaskCounts>, sqlx::Error> {
        let counts = sqlx::query_as::<_, DailyTaskCounts>(
            r#"
            SELECT day::date AS date,
                   COUNT(t.id) AS total,
                   COUNT(t.id) FILTER (WHERE t.completed) AS completed
            FROM generate_series($2::date, $3::date, INTERVAL '1 day') AS day
            LEFT JOIN tasks t
              ON t.user_id = $1
             AND (t.created_at AT TIME ZONE 'UTC')::date <= day::date
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let created = DateTime::parse_from_rfc3339("2025-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Read 30 minutes".to_string(),
            description: Some("Any book".to_string()),
            completed: false,
            due_date: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_patch_default_is_empty() {
        let patch = TaskPatch::default();
        assert!(patch.is_empty());

        let mut task = sample_task();
        let before = task.clone();
        assert!(!patch.apply(&mut task));
        assert_eq!(task, before);
    }

    #[test]
    fn test_patch_applies_present_fields_only() {
        let mut task = sample_task();
        let patch = TaskPatch {
            title: Some("  Read 45 minutes ".to_string()),
            completed: Some(true),
            ..Default::default()
        };

        assert!(patch.apply(&mut task));
        assert_eq!(task.title, "Read 45 minutes");
        assert!(task.completed);
        assert_eq!(task.description.as_deref(), Some("Any book"));
        assert!(task.updated_at > task.created_at);
    }

    #[test]
    fn test_patch_json_null_clears_field() {
        let patch: TaskPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert!(!patch.is_empty());

        let mut task = sample_task();
        patch.apply(&mut task);
        assert!(task.description.is_none());
    }

    #[test]
    fn test_patch_json_missing_field_keeps_value() {
        let patch: TaskPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(patch.description, None);
        assert_eq!(patch.due_date, None);
        assert_eq!(patch.completed, Some(true));
    }

    #[test]
    fn test_patch_json_due_date() {
        let patch: TaskPatch = serde_json::from_str(r#"{"due_date": "2025-02-01"}"#).unwrap();
        assert_eq!(
            patch.due_date,
            Some(Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()))
        );
    }
}
