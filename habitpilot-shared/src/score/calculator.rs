/// Completion score calculation
///
/// Pure functions that turn task counts into an integer percentage and fold a
/// window of daily scores into a period summary.
///
/// # Rounding
///
/// All divisions round half up on the exact rational value (integer
/// arithmetic, no floating point). For the non-negative inputs these functions
/// accept, that matches `f64::round`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use habitpilot_shared::score::calculator::{aggregate, daily_score, ScorePoint};
///
/// assert_eq!(daily_score(1, 3), 33);
/// assert_eq!(daily_score(2, 3), 67);
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// let summary = aggregate(&[
///     ScorePoint { date: day, score: 100 },
///     ScorePoint { date: day.pred_opt().unwrap(), score: 50 },
/// ]);
/// assert_eq!(summary.average, 75);
/// assert_eq!(summary.perfect_days, 1);
/// ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest score a day can reach
pub const MAX_SCORE: i32 = 100;

/// One day's score as consumed by [`aggregate`] and [`current_streak`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePoint {
    /// Calendar date of the score
    pub date: NaiveDate,

    /// Score in `[0, 100]`
    pub score: i32,
}

/// Summary of a window of daily scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Rounded arithmetic mean of the scores (0 when empty)
    pub average: i32,

    /// Number of scored days in the window
    pub count: usize,

    /// Number of days that scored exactly 100
    pub perfect_days: usize,
}

/// Divides `numerator / denominator`, rounding half up.
///
/// Callers guarantee `numerator >= 0` and `denominator > 0`.
fn div_round_half_up(numerator: i64, denominator: i64) -> i64 {
    (numerator.saturating_mul(2).saturating_add(denominator)) / denominator.saturating_mul(2)
}

/// Computes the completion score for a single day
///
/// Returns `0` when `total == 0`. Otherwise returns `completed / total * 100`
/// rounded half up and clamped to `[0, 100]`, so passing more completed tasks
/// than exist yields 100 rather than an out-of-range value.
///
/// Negative counts are a caller bug; they are asserted in debug builds only.
///
/// # Example
///
/// ```
/// use habitpilot_shared::score::calculator::daily_score;
///
/// assert_eq!(daily_score(0, 0), 0);
/// assert_eq!(daily_score(8, 10), 80);
/// assert_eq!(daily_score(1, 2), 50);
/// ```
pub fn daily_score(completed: i64, total: i64) -> i32 {
    debug_assert!(completed >= 0, "completed count must not be negative");
    debug_assert!(total >= 0, "total count must not be negative");

    if total <= 0 {
        return 0;
    }

    let completed = completed.max(0);
    let raw = div_round_half_up(completed.saturating_mul(100), total);

    raw.clamp(0, MAX_SCORE as i64) as i32
}

/// Aggregates daily scores into a period summary
///
/// A flat mean over whatever window the caller already selected. No
/// weighting or decay.
pub fn aggregate(points: &[ScorePoint]) -> ScoreSummary {
    if points.is_empty() {
        return ScoreSummary::default();
    }

    let sum: i64 = points.iter().map(|p| i64::from(p.score.max(0))).sum();
    let count = points.len();
    let perfect_days = points.iter().filter(|p| p.score == MAX_SCORE).count();

    ScoreSummary {
        average: div_round_half_up(sum, count as i64) as i32,
        count,
        perfect_days,
    }
}

/// Counts consecutive active days ending at `as_of`
///
/// A day is active when it has a score above zero. If `as_of` has no entry
/// yet, the run may end on the previous day instead. Gaps and zero-score days
/// break the run. Input order does not matter.
pub fn current_streak(points: &[ScorePoint], as_of: NaiveDate) -> u32 {
    let active = |date: NaiveDate| points.iter().any(|p| p.date == date && p.score > 0);
    let has_entry = points.iter().any(|p| p.date == as_of);

    let mut cursor = if has_entry {
        Some(as_of)
    } else {
        as_of.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor {
        if !active(day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn point(d: u32, score: i32) -> ScorePoint {
        ScorePoint { date: day(d), score }
    }

    #[test]
    fn test_daily_score_no_tasks() {
        assert_eq!(daily_score(0, 0), 0);
    }

    #[test]
    fn test_daily_score_bounds() {
        assert_eq!(daily_score(0, 5), 0);
        for total in 1..=50 {
            assert_eq!(daily_score(total, total), 100, "total = {}", total);
        }
    }

    #[test]
    fn test_daily_score_rounding() {
        assert_eq!(daily_score(8, 10), 80);
        assert_eq!(daily_score(1, 3), 33);
        assert_eq!(daily_score(2, 3), 67);
        assert_eq!(daily_score(1, 2), 50);
        assert_eq!(daily_score(3, 4), 75);
        // 12.5 rounds up
        assert_eq!(daily_score(1, 8), 13);
        // 87.5 rounds up
        assert_eq!(daily_score(7, 8), 88);
    }

    #[test]
    fn test_daily_score_clamps_overflowing_completed() {
        assert_eq!(daily_score(5, 4), 100);
        assert_eq!(daily_score(300, 1), 100);
    }

    #[test]
    fn test_daily_score_is_deterministic() {
        assert_eq!(daily_score(7, 9), daily_score(7, 9));
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]);
        assert_eq!(
            summary,
            ScoreSummary {
                average: 0,
                count: 0,
                perfect_days: 0
            }
        );
    }

    #[test]
    fn test_aggregate_average_and_perfect_days() {
        let points = vec![point(1, 100), point(2, 50), point(3, 100), point(4, 0)];
        let summary = aggregate(&points);

        assert_eq!(summary.count, 4);
        assert_eq!(summary.average, 63); // 62.5 rounds up
        assert_eq!(summary.perfect_days, 2);
    }

    #[test]
    fn test_aggregate_stays_in_range() {
        let points: Vec<ScorePoint> = (1..=28).map(|d| point(d, ((d * 37) % 101) as i32)).collect();
        let summary = aggregate(&points);

        assert_eq!(summary.count, 28);
        assert!((0..=100).contains(&summary.average));
    }

    #[test]
    fn test_streak_counts_back_from_as_of() {
        let points = vec![point(10, 40), point(9, 100), point(8, 20), point(6, 90)];
        assert_eq!(current_streak(&points, day(10)), 3);
    }

    #[test]
    fn test_streak_tolerates_unscored_today() {
        let points = vec![point(9, 100), point(8, 20)];
        assert_eq!(current_streak(&points, day(10)), 2);
    }

    #[test]
    fn test_streak_broken_by_zero_today() {
        let points = vec![point(10, 0), point(9, 100), point(8, 20)];
        assert_eq!(current_streak(&points, day(10)), 0);
    }

    #[test]
    fn test_streak_empty() {
        assert_eq!(current_streak(&[], day(10)), 0);
    }
}
