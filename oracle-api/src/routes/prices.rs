//! Published price endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use oracle_core::CurrencyPair;

use crate::AppState;

/// Published prices response
#[derive(Debug, Serialize)]
struct PricesResponse {
    /// Canonical price per pair from the most recent successful tick
    prices: HashMap<CurrencyPair, Decimal>,
    /// Time of the most recent successful tick, null before the first one
    last_sync: Option<DateTime<Utc>>,
}

/// Published prices handler
async fn get_prices(State(state): State<AppState>) -> Json<PricesResponse> {
    Json(PricesResponse {
        prices: state.oracle.get_prices(),
        last_sync: state.oracle.get_last_sync_time(),
    })
}

/// Create price routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/prices", get(get_prices))
}
