//! Price Oracle API Server
//!
//! Runs the oracle aggregation loop and serves the published prices over
//! HTTP.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use oracle_coinbase::CoinbaseClient;
use oracle_coingecko::CoinGeckoClient;
use oracle_core::{CurrencyPair, PriceProvider};
use oracle_service::{Oracle, OracleConfig};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub oracle: Arc<Oracle>,
    pub tick_interval: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,oracle_api=debug")),
        )
        .init();

    info!("Starting Price Oracle API");

    let pairs = parse_pairs(
        &std::env::var("ORACLE_PAIRS").unwrap_or_else(|_| "BTC/USD,ETH/USD".to_string()),
    )?;
    info!(
        "Configured pairs: {}",
        pairs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let tick_interval = Duration::from_secs(env_u64("ORACLE_TICK_INTERVAL_SECS", 5));
    let provider_timeout = Duration::from_millis(env_u64("ORACLE_PROVIDER_TIMEOUT_MS", 2500));

    // Build the provider set
    let mut providers: Vec<Arc<dyn PriceProvider>> = Vec::new();

    if env_flag("ORACLE_COINGECKO_ENABLED", true) {
        let coingecko = match std::env::var("COINGECKO_API_KEY") {
            Ok(key) => {
                info!("CoinGecko API key found, using pro API");
                CoinGeckoClient::with_api_key(pairs.clone(), key)
            }
            Err(_) => CoinGeckoClient::new(pairs.clone()),
        };
        providers.push(Arc::new(coingecko));
    }

    if env_flag("ORACLE_COINBASE_ENABLED", true) {
        providers.push(Arc::new(CoinbaseClient::new(pairs.clone())));
    }

    info!("Configured {} providers", providers.len());

    let oracle = Arc::new(Oracle::new(
        OracleConfig {
            tick_interval,
            provider_timeout,
        },
        providers,
    )?);

    // Ctrl+C cancels the oracle loop and drains the HTTP server
    let shutdown = CancellationToken::new();
    {
        let token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, initiating shutdown");
                token.cancel();
            }
        });
    }

    // Run the aggregation loop in the background
    let oracle_loop = Arc::clone(&oracle);
    let oracle_token = shutdown.clone();
    tokio::spawn(async move {
        match oracle_loop.start(oracle_token).await {
            Ok(()) => info!("Oracle loop stopped"),
            Err(e) => warn!("Oracle loop exited: {}", e),
        }
    });

    // Create app state
    let state = AppState {
        oracle: Arc::clone(&oracle),
        tick_interval,
    };

    // Configure CORS for consumers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let token = shutdown.clone();
            async move { token.cancelled().await }
        })
        .await?;

    oracle.stop().await;

    Ok(())
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

fn parse_pairs(raw: &str) -> anyhow::Result<Vec<CurrencyPair>> {
    let pairs = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<CurrencyPair>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pairs)
}
