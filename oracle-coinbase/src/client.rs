//! Coinbase API client
//!
//! Fetches spot prices from the public Coinbase prices API, one request per
//! configured pair, fanned out concurrently.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use oracle_core::{CurrencyPair, OracleError, PriceProvider, Quote};
use tracing::{debug, instrument, warn};

use crate::types::SpotPriceResponse;

/// Base URL for the Coinbase API
const COINBASE_API_BASE: &str = "https://api.coinbase.com/v2";

/// Coinbase price provider
#[derive(Clone)]
pub struct CoinbaseClient {
    client: Client,
    base_url: String,
    pairs: Vec<CurrencyPair>,
}

impl CoinbaseClient {
    /// Create a new client for the given pairs
    pub fn new(pairs: Vec<CurrencyPair>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: COINBASE_API_BASE.to_string(),
            pairs,
        }
    }

    fn spot_price_url(&self, pair: &CurrencyPair) -> String {
        format!(
            "{}/prices/{}-{}/spot",
            self.base_url,
            pair.base(),
            pair.quote()
        )
    }

    /// Fetch the spot price for a single pair
    async fn fetch_spot_price(&self, pair: &CurrencyPair) -> Result<Quote, OracleError> {
        let url = self.spot_price_url(pair);
        debug!("Fetching Coinbase spot price from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OracleError::network(format!("Failed to fetch spot price: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::api(format!(
                "Coinbase API error ({}): {}",
                status, body
            )));
        }

        let spot: SpotPriceResponse = response.json().await.map_err(|e| {
            OracleError::parse(format!("Failed to parse spot price response: {}", e))
        })?;

        Quote::new(pair.clone(), spot.data.amount, Utc::now())
    }
}

#[async_trait]
impl PriceProvider for CoinbaseClient {
    fn name(&self) -> &str {
        "coinbase"
    }

    #[instrument(skip(self))]
    async fn get_prices(&self) -> Result<HashMap<CurrencyPair, Quote>, OracleError> {
        let fetches = self.pairs.iter().map(|pair| async move {
            let result = self.fetch_spot_price(pair).await;
            (pair.clone(), result)
        });

        // A pair Coinbase can't serve is skipped, not fatal; the other
        // pairs still count.
        let mut quotes = HashMap::new();
        for (pair, result) in join_all(fetches).await {
            match result {
                Ok(quote) => {
                    quotes.insert(pair, quote);
                }
                Err(e) => warn!("Failed to fetch Coinbase price for {}: {}", pair, e),
            }
        }

        Ok(quotes)
    }
}
