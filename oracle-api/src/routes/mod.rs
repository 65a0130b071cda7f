//! API route definitions

mod health;
mod prices;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(prices::routes())
        .merge(health::routes())
}
