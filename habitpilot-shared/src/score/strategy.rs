/// Scoring strategies applied on top of the plain completion ratio
///
/// The persisted daily score is always the completion ratio. A strategy only
/// changes the number shown in the score snapshot.
///
/// - `completion_ratio`: the daily score unchanged
/// - `streak_bonus`: `score + min(streak * 2, 20)`, capped at 100

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::calculator::MAX_SCORE;

/// Bonus points per consecutive active day
pub const STREAK_BONUS_PER_DAY: u32 = 2;

/// Upper bound of the streak bonus
pub const STREAK_BONUS_CAP: u32 = 20;

/// How the headline score is derived from the daily score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Plain completion percentage
    #[default]
    CompletionRatio,

    /// Completion percentage plus a capped streak bonus
    StreakBonus,
}

impl ScoringStrategy {
    /// Gets strategy as string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStrategy::CompletionRatio => "completion_ratio",
            ScoringStrategy::StreakBonus => "streak_bonus",
        }
    }

    /// Applies the strategy to a base score and the current streak
    pub fn apply(&self, base: i32, streak: u32) -> i32 {
        match self {
            ScoringStrategy::CompletionRatio => base,
            ScoringStrategy::StreakBonus => {
                let bonus = streak
                    .saturating_mul(STREAK_BONUS_PER_DAY)
                    .min(STREAK_BONUS_CAP) as i32;
                base.saturating_add(bonus).min(MAX_SCORE)
            }
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown scoring strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for ScoringStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completion_ratio" | "ratio" => Ok(ScoringStrategy::CompletionRatio),
            "streak_bonus" | "streak" => Ok(ScoringStrategy::StreakBonus),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_ratio_ignores_streak() {
        assert_eq!(ScoringStrategy::CompletionRatio.apply(40, 9), 40);
    }

    #[test]
    fn test_streak_bonus() {
        let strategy = ScoringStrategy::StreakBonus;
        assert_eq!(strategy.apply(50, 0), 50);
        assert_eq!(strategy.apply(50, 3), 56);
        // Bonus caps at 20
        assert_eq!(strategy.apply(50, 15), 70);
        // Total caps at 100
        assert_eq!(strategy.apply(95, 5), 100);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            "streak_bonus".parse::<ScoringStrategy>().unwrap(),
            ScoringStrategy::StreakBonus
        );
        assert_eq!(
            " Completion_Ratio ".parse::<ScoringStrategy>().unwrap(),
            ScoringStrategy::CompletionRatio
        );
        assert!("weighted".parse::<ScoringStrategy>().is_err());
    }

    #[test]
    fn test_default_is_completion_ratio() {
        assert_eq!(ScoringStrategy::default(), ScoringStrategy::CompletionRatio);
        assert_eq!(ScoringStrategy::default().to_string(), "completion_ratio");
    }
}
