//! Provider abstraction for external price sources

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::OracleError;
use crate::types::{CurrencyPair, Quote};

/// A single external source of prices (exchange, aggregator, feed)
///
/// Each provider fetches quotes for its own configured set of currency
/// pairs. The oracle polls every provider concurrently each tick and bounds
/// each call with a deadline, so implementations may block for as long as
/// their transport needs. Implementations must not retain references to
/// oracle state across calls.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Stable display name, used to attribute quotes and log events
    fn name(&self) -> &str;

    /// Fetch current quotes for this provider's configured pairs
    ///
    /// Pairs the provider cannot price are simply absent from the result.
    async fn get_prices(&self) -> Result<HashMap<CurrencyPair, Quote>, OracleError>;
}
