//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Number of tick intervals after which the price feed counts as stale
const STALE_TICKS: i64 = 3;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    running: bool,
    last_sync: Option<DateTime<Utc>>,
    stale: bool,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let running = state.oracle.is_running();
    let last_sync = state.oracle.get_last_sync_time();

    let stale_after =
        chrono::Duration::milliseconds(state.tick_interval.as_millis() as i64 * STALE_TICKS);
    let stale = match last_sync {
        Some(t) => Utc::now() - t > stale_after,
        None => true,
    };

    let healthy = running && !stale;
    let status = if healthy { "healthy" } else { "degraded" };

    let response = HealthResponse {
        status: status.to_string(),
        running,
        last_sync,
        stale,
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
