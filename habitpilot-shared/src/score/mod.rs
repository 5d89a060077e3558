/// Habit scoring
///
/// - `calculator`: pure score math (daily ratio, aggregates, streaks)
/// - `strategy`: selectable scoring strategies layered on the ratio
/// - `service`: computes and caches scores through the store traits
///
/// # Example
///
/// ```
/// use habitpilot_shared::score::calculator::daily_score;
///
/// assert_eq!(daily_score(3, 4), 75);
/// assert_eq!(daily_score(0, 0), 0);
/// ```

pub mod calculator;
pub mod service;
pub mod strategy;

pub use calculator::{aggregate, current_streak, daily_score, ScorePoint, ScoreSummary, MAX_SCORE};
pub use service::{PeriodReport, ScoreService, ScoreSnapshot};
pub use strategy::ScoringStrategy;
