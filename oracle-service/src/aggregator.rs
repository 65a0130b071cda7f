//! Per-tick price accumulation
//!
//! A [`PriceAggregator`] collects each provider's quote map during a single
//! tick. It lives exactly one tick: runners write into it concurrently and
//! the reducer drains it at the fan-in barrier.

use std::collections::HashMap;
use std::mem;

use parking_lot::Mutex;

use oracle_core::{CurrencyPair, Quote};

/// Per-provider quote maps accumulated within one tick, keyed by the
/// provider's display name
pub type ProviderPrices = HashMap<String, HashMap<CurrencyPair, Quote>>;

/// Thread-safe accumulator of per-provider quote sets within a single tick
#[derive(Debug, Default)]
pub struct PriceAggregator {
    prices: Mutex<ProviderPrices>,
}

impl PriceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `quotes` under the provider's slot, replacing any prior entry
    /// for that provider in this tick
    ///
    /// Safe under concurrent calls from distinct providers; each provider
    /// gets exactly one slot, so a provider reporting twice keeps only its
    /// last report.
    pub fn set_prices(&self, provider: &str, quotes: HashMap<CurrencyPair, Quote>) {
        self.prices.lock().insert(provider.to_string(), quotes);
    }

    /// Move the accumulated per-provider map out of the aggregator
    ///
    /// Called once, after the fan-in barrier. Draining the map freezes the
    /// snapshot: a runner abandoned by timeout or cancellation that writes
    /// afterwards writes into a map nobody reads again.
    pub fn take_snapshot(&self) -> ProviderPrices {
        mem::take(&mut *self.prices.lock())
    }
}
