/// Daily score model and database operations
///
/// A daily score is a cached snapshot of one user's completion percentage on
/// one calendar date. The task table stays the source of truth; rows here are
/// recomputed on demand and overwritten.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE daily_scores (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     score INTEGER NOT NULL DEFAULT 0 CHECK (score BETWEEN 0 AND 100),
///     tasks_completed BIGINT NOT NULL DEFAULT 0,
///     total_tasks BIGINT NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, date)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::score::calculator::ScorePoint;

/// Cached completion score for one user on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyScore {
    /// Owner of the score
    pub user_id: Uuid,

    /// Calendar date (no time component)
    pub date: NaiveDate,

    /// Score in `[0, 100]`
    pub score: i32,

    /// Completed tasks counted for the date
    pub tasks_completed: i64,

    /// Total tasks counted for the date
    pub total_tasks: i64,

    /// When this value was (re)computed
    pub created_at: DateTime<Utc>,
}

impl From<&DailyScore> for ScorePoint {
    fn from(value: &DailyScore) -> Self {
        ScorePoint {
            date: value.date,
            score: value.score,
        }
    }
}

impl DailyScore {
    /// Inserts or replaces the score for `(user_id, date)`
    ///
    /// Concurrent writers for the same key resolve last-writer-wins.
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
        score: i32,
        tasks_completed: i64,
        total_tasks: i64,
    ) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, DailyScore>(
            r#"
            INSERT INTO daily_scores (user_id, date, score, tasks_completed, total_tasks)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, date) DO UPDATE
            SET score = EXCLUDED.score,
                tasks_completed = EXCLUDED.tasks_completed,
                total_tasks = EXCLUDED.total_tasks,
                created_at = NOW()
            RETURNING user_id, date, score, tasks_completed, total_tasks, created_at
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(score)
        .bind(tasks_completed)
        .bind(total_tasks)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Lists scores with `start <= date <= end`, newest first
    pub async fn list_range(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DailyScore>(
            r#"
            SELECT user_id, date, score, tasks_completed, total_tasks, created_at
            FROM daily_scores
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Counts stored score rows for a user
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM daily_scores WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
