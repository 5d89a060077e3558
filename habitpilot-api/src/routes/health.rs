/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 4, "total_connections": 5 },
///   "timestamp": "2025-01-01T00:00:00Z"
/// }
/// ```
///
/// Always answers 200; a failed store ping reports `"degraded"`.

use crate::app::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use habitpilot_shared::db::pool::PoolStats;
use serde::Serialize;
use tracing::warn;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// "connected" or "disconnected"
    pub database: &'static str,

    /// Connection pool usage, when backed by a pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,

    /// Server time
    pub timestamp: DateTime<Utc>,
}

/// Reports service and database health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match state.health.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        pool: state.health.pool_stats(),
        timestamp: Utc::now(),
    })
}
