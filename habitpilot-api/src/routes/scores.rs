/// Score endpoints
///
/// Field names are camelCase, matching what the web client consumes.
///
/// - `GET  /api/scores/daily?date=YYYY-MM-DD`: compute and store one day (default today, UTC)
/// - `GET  /api/scores/weekly`: stored scores of the trailing week
/// - `GET  /api/scores/monthly`: stored scores of the trailing month
/// - `POST /api/scores/recompute?start=&end=`: backfill a date range
/// - `GET  /api/scores/summary?strategy=`: today's score with streak

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use habitpilot_shared::{
    auth::middleware::AuthContext,
    models::daily_score::DailyScore,
    score::{aggregate, service::window_start, ScorePoint, ScoringStrategy},
};
use serde::{Deserialize, Serialize};

/// Longest range accepted by the recompute endpoint, in days
pub const MAX_RECOMPUTE_DAYS: i64 = 366;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One day's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScoreResponse {
    pub date: NaiveDate,
    pub score: i32,
    pub tasks_completed: i64,
    pub total_tasks: i64,
}

impl From<DailyScore> for DailyScoreResponse {
    fn from(row: DailyScore) -> Self {
        Self {
            date: row.date,
            score: row.score,
            tasks_completed: row.tasks_completed,
            total_tasks: row.total_tasks,
        }
    }
}

/// Weekly report
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyResponse {
    pub weekly_average: i32,
    pub perfect_days: usize,
    pub total_days: usize,
    pub daily_scores: Vec<DailyScoreResponse>,
}

/// Monthly report
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResponse {
    pub monthly_average: i32,
    pub perfect_days: usize,
    pub total_days: usize,
    pub daily_scores: Vec<DailyScoreResponse>,
}

/// Result of a backfill
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub average: i32,
    pub perfect_days: usize,
    pub total_days: usize,
    pub daily_scores: Vec<DailyScoreResponse>,
}

/// Today's headline score
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub date: NaiveDate,
    pub score: i32,
    pub base_score: i32,
    pub tasks_completed: i64,
    pub total_tasks: i64,
    pub streak: u32,
    pub strategy: ScoringStrategy,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub strategy: Option<String>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn parse_date(field: &str, raw: Option<&str>, default: NaiveDate) -> ApiResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| {
            ApiError::BadRequest(format!("Invalid {field} date {s:?}, expected YYYY-MM-DD"))
        }),
    }
}

/// Computes, stores and returns the score of one day
pub async fn daily(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<DailyQuery>,
) -> ApiResult<Json<DailyScoreResponse>> {
    let date = parse_date("date", query.date.as_deref(), today())?;
    let score = state.score_service().daily(auth.user_id, date).await?;

    Ok(Json(score.into()))
}

/// Stored scores of the trailing week
pub async fn weekly(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<WeeklyResponse>> {
    let days = state.config.scoring.weekly_days;
    let report = state.score_service().period(auth.user_id, today(), days).await?;

    Ok(Json(WeeklyResponse {
        weekly_average: report.summary.average,
        perfect_days: report.summary.perfect_days,
        total_days: report.summary.count,
        daily_scores: report.scores.into_iter().map(Into::into).collect(),
    }))
}

/// Stored scores of the trailing month
pub async fn monthly(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<MonthlyResponse>> {
    let days = state.config.scoring.monthly_days;
    let report = state.score_service().period(auth.user_id, today(), days).await?;

    Ok(Json(MonthlyResponse {
        monthly_average: report.summary.average,
        perfect_days: report.summary.perfect_days,
        total_days: report.summary.count,
        daily_scores: report.scores.into_iter().map(Into::into).collect(),
    }))
}

/// Recomputes every day in `[start, end]`
///
/// `end` defaults to today and `start` to the beginning of the weekly window
/// ending at `end`.
pub async fn recompute(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<RecomputeResponse>> {
    let end = parse_date("end", query.end.as_deref(), today())?;
    let start = parse_date(
        "start",
        query.start.as_deref(),
        window_start(end, state.config.scoring.weekly_days),
    )?;

    if start > end {
        return Err(ApiError::BadRequest("start must not be after end".to_string()));
    }
    if (end - start).num_days() >= MAX_RECOMPUTE_DAYS {
        return Err(ApiError::BadRequest(format!(
            "Range must not exceed {MAX_RECOMPUTE_DAYS} days"
        )));
    }

    let scores = state
        .score_service()
        .recompute_range(auth.user_id, start, end)
        .await?;
    let points: Vec<ScorePoint> = scores.iter().map(ScorePoint::from).collect();
    let summary = aggregate(&points);

    Ok(Json(RecomputeResponse {
        start,
        end,
        average: summary.average,
        perfect_days: summary.perfect_days,
        total_days: summary.count,
        daily_scores: scores.into_iter().map(Into::into).collect(),
    }))
}

/// Today's score, with the requested or configured strategy applied
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let strategy = match query.strategy.as_deref() {
        Some(raw) => raw
            .parse::<ScoringStrategy>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => state.config.scoring.default_strategy,
    };

    let date = today();
    let snapshot = state
        .score_service()
        .summary(auth.user_id, date, strategy)
        .await?;

    Ok(Json(SummaryResponse {
        date,
        score: snapshot.score,
        base_score: snapshot.base_score,
        tasks_completed: snapshot.completed,
        total_tasks: snapshot.total,
        streak: snapshot.streak,
        strategy: snapshot.strategy,
        last_updated: snapshot.last_updated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let fallback = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert_eq!(parse_date("date", None, fallback).unwrap(), fallback);
        assert_eq!(parse_date("date", Some(" "), fallback).unwrap(), fallback);
        assert_eq!(
            parse_date("date", Some("2025-02-28"), fallback).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(parse_date("date", Some("2025-02-30"), fallback).is_err());
        assert!(parse_date("date", Some("28/02/2025"), fallback).is_err());
    }

    #[test]
    fn test_daily_score_json_is_camel_case() {
        let json = serde_json::to_value(DailyScoreResponse {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            score: 67,
            tasks_completed: 2,
            total_tasks: 3,
        })
        .unwrap();

        assert_eq!(json["date"], "2025-03-01");
        assert_eq!(json["tasksCompleted"], 2);
        assert_eq!(json["totalTasks"], 3);
    }
}
