/// Score service
///
/// Glues the pure calculator to the stores: reads task counts, computes a
/// score, writes back the one affected daily score row, and builds period
/// reports. Each call is a single request/response step with no background
/// work; concurrent recomputation of the same `(user, date)` is settled by
/// the store's upsert (last writer wins).
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use habitpilot_shared::score::service::ScoreService;
/// use habitpilot_shared::store::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), habitpilot_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let service = ScoreService::new(&store, &store);
///
/// let today = Utc::now().date_naive();
/// let score = service.daily(Uuid::new_v4(), today).await?;
/// assert_eq!(score.score, 0);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::calculator::{aggregate, current_streak, daily_score, ScorePoint, ScoreSummary};
use super::strategy::ScoringStrategy;
use crate::models::daily_score::DailyScore;
use crate::store::{ScoreStore, StoreResult, TaskStore};

/// Days of history inspected when computing the current streak
pub const STREAK_LOOKBACK_DAYS: u32 = 30;

/// Scores of a trailing window plus their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    /// First day of the window
    pub start: NaiveDate,

    /// Last day of the window
    pub end: NaiveDate,

    /// Aggregate over `scores`
    pub summary: ScoreSummary,

    /// Stored scores in the window, newest first
    pub scores: Vec<DailyScore>,
}

/// Headline score for the score widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Score after applying `strategy`
    pub score: i32,

    /// Plain completion ratio score
    pub base_score: i32,

    /// Completed task count
    pub completed: i64,

    /// Total task count
    pub total: i64,

    /// Consecutive active days ending today, or yesterday while today has no completions
    pub streak: u32,

    /// Strategy used for `score`
    pub strategy: ScoringStrategy,

    /// When the snapshot was computed
    pub last_updated: DateTime<Utc>,
}

/// First day of a trailing window of `days` days ending at `end`
///
/// A window of 0 or 1 days is just `end`.
pub fn window_start(end: NaiveDate, days: u32) -> NaiveDate {
    let span = i64::from(days.max(1)) - 1;
    end.checked_sub_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Score operations over injected stores
pub struct ScoreService<'a> {
    tasks: &'a dyn TaskStore,
    scores: &'a dyn ScoreStore,
}

impl<'a> ScoreService<'a> {
    /// Creates a service over the given stores
    pub fn new(tasks: &'a dyn TaskStore, scores: &'a dyn ScoreStore) -> Self {
        Self { tasks, scores }
    }

    /// Computes, stores and returns the score of `date`
    pub async fn daily(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<DailyScore> {
        let counts = self.tasks.count_tasks(user_id, date).await?;
        let score = daily_score(counts.completed, counts.total);

        self.scores
            .upsert_daily_score(user_id, date, score, counts.completed, counts.total)
            .await?;

        debug!(
            user_id = %user_id,
            %date,
            score,
            completed = counts.completed,
            total = counts.total,
            "Daily score computed"
        );

        Ok(DailyScore {
            user_id,
            date,
            score,
            tasks_completed: counts.completed,
            total_tasks: counts.total,
            created_at: Utc::now(),
        })
    }

    /// Summarizes the stored scores of the `days`-day window ending at `end`
    ///
    /// The window is `[end - (days - 1), end]`, so a weekly report spans
    /// exactly 7 calendar days. This differs from a
    /// `date >= DATE('now', '-7 days')` filter, which spans 8 days (31 for a
    /// 30-day month window).
    pub async fn period(&self, user_id: Uuid, end: NaiveDate, days: u32) -> StoreResult<PeriodReport> {
        let start = window_start(end, days);
        let scores = self.scores.get_daily_scores(user_id, start, end).await?;
        let points: Vec<ScorePoint> = scores.iter().map(ScorePoint::from).collect();

        Ok(PeriodReport {
            start,
            end,
            summary: aggregate(&points),
            scores,
        })
    }

    /// Recomputes and stores one score per day in `[start, end]`
    ///
    /// Returns the fresh scores, newest first.
    pub async fn recompute_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyScore>> {
        let per_day = self.tasks.count_tasks_in_range(user_id, start, end).await?;
        let mut recomputed = Vec::with_capacity(per_day.len());

        for counts in per_day {
            let score = daily_score(counts.completed, counts.total);
            self.scores
                .upsert_daily_score(user_id, counts.date, score, counts.completed, counts.total)
                .await?;

            recomputed.push(DailyScore {
                user_id,
                date: counts.date,
                score,
                tasks_completed: counts.completed,
                total_tasks: counts.total,
                created_at: Utc::now(),
            });
        }

        recomputed.reverse();

        info!(
            user_id = %user_id,
            %start,
            %end,
            days = recomputed.len(),
            "Recomputed daily scores"
        );

        Ok(recomputed)
    }

    /// Computes today's score and applies `strategy` with the current streak
    pub async fn summary(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        strategy: ScoringStrategy,
    ) -> StoreResult<ScoreSnapshot> {
        let today_score = self.daily(user_id, today).await?;

        let history = self
            .scores
            .get_daily_scores(user_id, window_start(today, STREAK_LOOKBACK_DAYS), today)
            .await?;
        // A zero score today means the day is still open, not that the run broke.
        let points: Vec<ScorePoint> = history
            .iter()
            .filter(|s| s.date != today || s.score > 0)
            .map(ScorePoint::from)
            .collect();
        let streak = current_streak(&points, today);

        Ok(ScoreSnapshot {
            score: strategy.apply(today_score.score, streak),
            base_score: today_score.score,
            completed: today_score.tasks_completed,
            total: today_score.total_tasks,
            streak,
            strategy,
            last_updated: today_score.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            due_date: None,
        }
    }

    async fn complete(store: &MemoryStore, owner: Uuid, task_id: Uuid) {
        let mut task = store.find_task(owner, task_id).await.unwrap().unwrap();
        task.completed = true;
        store.update_task(&task).await.unwrap();
    }

    #[test]
    fn test_window_start() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(window_start(end, 7), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(window_start(end, 1), end);
        assert_eq!(window_start(end, 0), end);
        assert_eq!(window_start(end, 30), NaiveDate::from_ymd_opt(2025, 2, 9).unwrap());
    }

    #[tokio::test]
    async fn test_half_completed_day_scores_fifty_once() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);
        let user = Uuid::new_v4();
        let today = Utc::now().date_naive();

        let first = store.insert_task(user, new_task("Stretch")).await.unwrap();
        store.insert_task(user, new_task("Read")).await.unwrap();
        complete(&store, user, first.id).await;

        let score = service.daily(user, today).await.unwrap();
        assert_eq!(score.score, 50);
        assert_eq!(score.tasks_completed, 1);
        assert_eq!(score.total_tasks, 2);

        // Recomputing the same day overwrites rather than duplicates
        service.daily(user, today).await.unwrap();
        assert_eq!(store.score_rows(user).await, 1);

        let rows = store.get_daily_scores(user, today, today).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 50);
    }

    #[tokio::test]
    async fn test_daily_ignores_tasks_created_later() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);
        let user = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();

        store.insert_task_at(user, new_task("Walk"), created).await;

        let before = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let score = service.daily(user, before).await.unwrap();
        assert_eq!(score.total_tasks, 0);
        assert_eq!(score.score, 0);
    }

    #[tokio::test]
    async fn test_period_report() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);
        let user = Uuid::new_v4();
        let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        store.upsert_daily_score(user, end, 100, 4, 4).await.unwrap();
        store
            .upsert_daily_score(user, end - Duration::days(1), 50, 2, 4)
            .await
            .unwrap();
        // Outside a 7-day window
        store
            .upsert_daily_score(user, end - Duration::days(7), 0, 0, 4)
            .await
            .unwrap();

        let report = service.period(user, end, 7).await.unwrap();
        assert_eq!(report.start, end - Duration::days(6));
        assert_eq!(report.summary.count, 2);
        assert_eq!(report.summary.average, 75);
        assert_eq!(report.summary.perfect_days, 1);
        assert_eq!(report.scores[0].date, end);

        let month = service.period(user, end, 30).await.unwrap();
        assert_eq!(month.summary.count, 3);
        assert_eq!(month.summary.average, 50);
    }

    #[tokio::test]
    async fn test_period_without_scores() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);

        let report = service
            .period(Uuid::new_v4(), Utc::now().date_naive(), 7)
            .await
            .unwrap();
        assert_eq!(report.summary, ScoreSummary::default());
        assert!(report.scores.is_empty());
    }

    #[tokio::test]
    async fn test_recompute_range_backfills() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);
        let user = Uuid::new_v4();
        let day1 = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();

        let a = store.insert_task_at(user, new_task("a"), day1).await;
        store
            .insert_task_at(user, new_task("b"), day1 + Duration::days(1))
            .await;
        complete(&store, user, a.id).await;

        let start = day1.date_naive();
        let end = start + Duration::days(2);
        let scores = service.recompute_range(user, start, end).await.unwrap();

        let got: Vec<(NaiveDate, i32)> = scores.iter().map(|s| (s.date, s.score)).collect();
        assert_eq!(
            got,
            vec![(end, 50), (start + Duration::days(1), 50), (start, 100)]
        );
        assert_eq!(store.score_rows(user).await, 3);
    }

    #[tokio::test]
    async fn test_summary_with_streak_bonus() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);
        let user = Uuid::new_v4();
        let today = Utc::now().date_naive();

        let t = store.insert_task(user, new_task("Meditate")).await.unwrap();
        store.insert_task(user, new_task("Journal")).await.unwrap();
        complete(&store, user, t.id).await;

        for back in 1..=3 {
            store
                .upsert_daily_score(user, today - Duration::days(back), 100, 2, 2)
                .await
                .unwrap();
        }

        let plain = service
            .summary(user, today, ScoringStrategy::CompletionRatio)
            .await
            .unwrap();
        assert_eq!(plain.base_score, 50);
        assert_eq!(plain.score, 50);
        assert_eq!(plain.streak, 4);

        let bonus = service
            .summary(user, today, ScoringStrategy::StreakBonus)
            .await
            .unwrap();
        assert_eq!(bonus.score, 58);
        assert_eq!(bonus.strategy, ScoringStrategy::StreakBonus);
    }

    #[tokio::test]
    async fn test_summary_keeps_streak_before_first_completion_of_day() {
        let store = MemoryStore::new();
        let service = ScoreService::new(&store, &store);
        let user = Uuid::new_v4();
        let today = Utc::now().date_naive();

        store.insert_task(user, new_task("Walk")).await.unwrap();
        for back in 1..=3 {
            store
                .upsert_daily_score(user, today - Duration::days(back), 100, 1, 1)
                .await
                .unwrap();
        }

        let snapshot = service
            .summary(user, today, ScoringStrategy::StreakBonus)
            .await
            .unwrap();
        assert_eq!(snapshot.base_score, 0);
        assert_eq!(snapshot.streak, 3);
        assert_eq!(snapshot.score, 6);

        // Today's zero row is still stored
        let rows = store.get_daily_scores(user, today, today).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 0);
    }
}
