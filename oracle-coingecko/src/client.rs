//! CoinGecko API client
//!
//! Fetches spot prices for all configured pairs in a single batched
//! simple-price request per call.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use oracle_core::{CurrencyPair, OracleError, PriceProvider, Quote};
use tracing::{debug, instrument};

use crate::types::{coin_id_for, SimplePriceResponse};

/// Base URL for the free CoinGecko API
const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
/// Base URL for the pro CoinGecko API (used when an API key is set)
const COINGECKO_PRO_API_BASE: &str = "https://pro-api.coingecko.com/api/v3";

/// Header carrying the pro API key
const API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// Fractional digits requested from the API
const PRICE_PRECISION: &str = "18";

/// CoinGecko price provider
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    pairs: Vec<CurrencyPair>,
    coin_id_overrides: HashMap<String, String>,
}

impl CoinGeckoClient {
    /// Create a new client against the free API
    pub fn new(pairs: Vec<CurrencyPair>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: COINGECKO_API_BASE.to_string(),
            api_key: None,
            pairs,
            coin_id_overrides: HashMap::new(),
        }
    }

    /// Create a client that uses the pro API with the given key
    pub fn with_api_key(pairs: Vec<CurrencyPair>, api_key: String) -> Self {
        let mut client = Self::new(pairs);
        client.base_url = COINGECKO_PRO_API_BASE.to_string();
        client.api_key = Some(api_key);
        client
    }

    /// Register a coin id for a base symbol the built-in table doesn't know
    pub fn with_coin_id(mut self, symbol: impl Into<String>, coin_id: impl Into<String>) -> Self {
        self.coin_id_overrides
            .insert(symbol.into().to_uppercase(), coin_id.into());
        self
    }

    /// Resolve the CoinGecko coin id for a base symbol
    fn coin_id(&self, symbol: &str) -> Option<&str> {
        self.coin_id_overrides
            .get(symbol)
            .map(String::as_str)
            .or_else(|| coin_id_for(symbol))
    }

    /// Build the batched simple-price URL for the configured pairs
    fn price_url(&self) -> String {
        let mut ids: Vec<&str> = self
            .pairs
            .iter()
            .filter_map(|pair| self.coin_id(pair.base()))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let mut currencies: Vec<String> = self
            .pairs
            .iter()
            .map(|pair| pair.quote().to_lowercase())
            .collect();
        currencies.sort();
        currencies.dedup();

        format!(
            "{}/simple/price?ids={}&vs_currencies={}&precision={}",
            self.base_url,
            ids.join(","),
            currencies.join(","),
            PRICE_PRECISION
        )
    }

    /// Read the configured pairs back out of a simple-price response
    ///
    /// The API answers the full id/currency cross product, and some of those
    /// crosses are pairs nobody asked for; only configured pairs are kept.
    /// Pairs missing from the response are skipped.
    fn parse_response(&self, response: &SimplePriceResponse) -> HashMap<CurrencyPair, Quote> {
        let now = Utc::now();
        let mut quotes = HashMap::new();

        for pair in &self.pairs {
            let Some(id) = self.coin_id(pair.base()) else {
                debug!("No CoinGecko id for {}", pair.base());
                continue;
            };
            let Some(by_currency) = response.get(id) else {
                continue;
            };
            let Some(price) = by_currency.get(&pair.quote().to_lowercase()) else {
                continue;
            };

            match Quote::new(pair.clone(), *price, now) {
                Ok(quote) => {
                    quotes.insert(pair.clone(), quote);
                }
                Err(e) => debug!("Skipping CoinGecko quote for {}: {}", pair, e),
            }
        }

        quotes
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    fn name(&self) -> &str {
        "coingecko"
    }

    #[instrument(skip(self))]
    async fn get_prices(&self) -> Result<HashMap<CurrencyPair, Quote>, OracleError> {
        let url = self.price_url();
        debug!("Fetching CoinGecko prices from: {}", url);

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OracleError::network(format!("Failed to fetch prices: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        let prices: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("Failed to parse price response: {}", e)))?;

        Ok(self.parse_response(&prices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pairs() -> Vec<CurrencyPair> {
        vec![
            CurrencyPair::new("BTC", "USD"),
            CurrencyPair::new("ATOM", "USD"),
        ]
    }

    #[test]
    fn test_price_url_batches_ids_and_currencies() {
        let client = CoinGeckoClient::new(pairs());
        let url = client.price_url();

        assert!(url.starts_with(COINGECKO_API_BASE));
        assert!(url.contains("ids=bitcoin,cosmos"));
        assert!(url.contains("vs_currencies=usd"));
        assert!(url.contains("precision=18"));
    }

    #[test]
    fn test_api_key_switches_to_pro_base() {
        let client = CoinGeckoClient::with_api_key(pairs(), "key".to_string());
        assert!(client.price_url().starts_with(COINGECKO_PRO_API_BASE));
    }

    #[test]
    fn test_parse_response_keeps_configured_pairs_only() {
        let client = CoinGeckoClient::new(pairs());
        let response: SimplePriceResponse = serde_json::from_str(
            r#"{
                "bitcoin": { "usd": 30000.0 },
                "cosmos": { "usd": 11.35 },
                "ethereum": { "usd": 2000.0 }
            }"#,
        )
        .unwrap();

        let quotes = client.parse_response(&response);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[&CurrencyPair::new("BTC", "USD")].price, dec!(30000));
        assert_eq!(quotes[&CurrencyPair::new("ATOM", "USD")].price, dec!(11.35));
    }

    #[test]
    fn test_parse_response_skips_missing_pairs() {
        let client = CoinGeckoClient::new(pairs());
        let response: SimplePriceResponse =
            serde_json::from_str(r#"{ "bitcoin": { "eur": 28000.0 } }"#).unwrap();

        assert!(client.parse_response(&response).is_empty());
    }

    #[test]
    fn test_coin_id_override() {
        let pair = CurrencyPair::new("NTRN", "USD");
        let client = CoinGeckoClient::new(vec![pair.clone()]).with_coin_id("NTRN", "neutron-3");

        assert!(client.price_url().contains("ids=neutron-3"));

        let response: SimplePriceResponse =
            serde_json::from_str(r#"{ "neutron-3": { "usd": 0.45 } }"#).unwrap();
        let quotes = client.parse_response(&response);
        assert_eq!(quotes[&pair].price, dec!(0.45));
    }
}
