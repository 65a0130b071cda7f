//! Price oracle aggregation loop
//!
//! Background service that periodically polls every configured provider
//! under a per-provider deadline, reduces the reported quotes to a median
//! price per pair, and atomically publishes the result for concurrent
//! readers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use oracle_core::{CurrencyPair, OracleError, PriceProvider};

use crate::aggregator::PriceAggregator;
use crate::median::compute_median;

/// Configuration for the oracle loop
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Interval between aggregation ticks
    pub tick_interval: Duration,
    /// Maximum time to wait for any single provider within a tick
    pub provider_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            provider_timeout: Duration::from_millis(2500),
        }
    }
}

/// Prices visible to readers, replaced wholesale each successful tick
///
/// Both fields live behind one lock so a reader sees the prices and the
/// sync time of the same tick, never a mix of two ticks.
#[derive(Debug, Default)]
struct PublishedPrices {
    prices: HashMap<CurrencyPair, Decimal>,
    last_sync: Option<DateTime<Utc>>,
}

/// Background service that aggregates provider prices into a median feed
///
/// Each tick the oracle fans out one runner per provider, waits for all of
/// them at a barrier, reduces the accumulated quotes with
/// [`compute_median`](crate::median::compute_median), and replaces the
/// published prices. Provider failures, timeouts, and panics are
/// observations logged against the provider name; they never fail a tick.
pub struct Oracle {
    providers: Vec<Arc<dyn PriceProvider>>,
    tick_interval: Duration,
    provider_timeout: Duration,
    /// True while the main loop is executing
    running: AtomicBool,
    /// Cancelled by [`stop`](Oracle::stop); observed by the main loop
    stop: CancellationToken,
    /// Flipped to true whenever the main loop is not executing
    done: watch::Sender<bool>,
    published: RwLock<PublishedPrices>,
}

impl Oracle {
    /// Create a new oracle over the given providers
    ///
    /// The provider set is fixed for the life of the oracle. An empty set is
    /// allowed; every tick then publishes an empty map. A zero tick interval
    /// is a configuration error.
    pub fn new(
        config: OracleConfig,
        providers: Vec<Arc<dyn PriceProvider>>,
    ) -> Result<Self, OracleError> {
        if config.tick_interval.is_zero() {
            return Err(OracleError::config("tick interval must be positive"));
        }

        let (done, _) = watch::channel(true);

        Ok(Self {
            providers,
            tick_interval: config.tick_interval,
            provider_timeout: config.provider_timeout,
            running: AtomicBool::new(false),
            stop: CancellationToken::new(),
            done,
            published: RwLock::new(PublishedPrices::default()),
        })
    }

    /// Run the blocking oracle loop
    ///
    /// Returns `Ok(())` after [`stop`](Oracle::stop), or
    /// `Err(OracleError::Cancelled)` when `shutdown` is cancelled. A tick in
    /// progress at shutdown is aborted without publishing.
    pub async fn start(self: Arc<Self>, shutdown: CancellationToken) -> Result<(), OracleError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(OracleError::config("oracle is already running"));
        }

        info!(
            "Starting oracle: {} providers, tick interval {:?}, provider timeout {:?}",
            self.providers.len(),
            self.tick_interval,
            self.provider_timeout
        );
        self.done.send_replace(false);

        let result = Arc::clone(&self).run(shutdown).await;

        self.running.store(false, Ordering::SeqCst);
        self.done.send_replace(true);
        result
    }

    async fn run(self: Arc<Self>, shutdown: CancellationToken) -> Result<(), OracleError> {
        let mut ticker = interval(self.tick_interval);
        // Never overlap ticks; a schedule missed while a tick drains is
        // dropped rather than queued.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval completes immediately; consume
        // it so the first real tick fires one full interval after start.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Oracle shutdown: parent cancelled");
                    self.stop.cancel();
                    return Err(OracleError::cancelled("parent context cancelled"));
                }
                _ = self.stop.cancelled() => {
                    info!("Oracle stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    // The tick runs as its own task: a panic anywhere in the
                    // tick body surfaces here as a JoinError instead of
                    // taking down the loop, and stop/shutdown can abort a
                    // tick that is still draining.
                    let mut tick_task = tokio::spawn(Arc::clone(&self).tick());

                    tokio::select! {
                        result = &mut tick_task => {
                            if let Err(e) = result {
                                if e.is_panic() {
                                    error!("Oracle tick panicked; previous prices remain published");
                                } else {
                                    warn!("Oracle tick was cancelled");
                                }
                            }
                        }
                        _ = shutdown.cancelled() => {
                            tick_task.abort();
                            info!("Oracle shutdown: parent cancelled mid-tick");
                            self.stop.cancel();
                            return Err(OracleError::cancelled("parent context cancelled"));
                        }
                        _ = self.stop.cancelled() => {
                            tick_task.abort();
                            info!("Oracle stopped mid-tick");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Execute one aggregation tick
    async fn tick(self: Arc<Self>) {
        info!("Starting oracle tick");

        let aggregator = Arc::new(PriceAggregator::new());

        let runners: Vec<_> = self
            .providers
            .iter()
            .map(|provider| {
                tokio::spawn(Self::run_provider(
                    Arc::clone(provider),
                    Arc::clone(&aggregator),
                    self.provider_timeout,
                ))
            })
            .collect();

        // Fan-in barrier. Runners absorb their own provider's failures, so a
        // join error here means something broke outside provider code; in
        // that case the tick publishes nothing.
        let mut barrier_failed = false;
        for result in join_all(runners).await {
            if let Err(e) = result {
                if e.is_panic() {
                    error!("Price runner panicked: {}", e);
                } else {
                    warn!("Price runner cancelled: {}", e);
                }
                barrier_failed = true;
            }
        }

        if barrier_failed {
            warn!("Skipping price publication for this tick");
            return;
        }

        let snapshot = aggregator.take_snapshot();
        let prices = compute_median(snapshot);
        let count = prices.len();

        {
            let mut published = self.published.write();
            published.prices = prices;
            published.last_sync = Some(Utc::now());
        }

        info!("Oracle updated prices for {} pairs", count);
    }

    /// Run a single provider's fetch under the per-provider deadline
    ///
    /// Every outcome is an observation: success writes the provider's quotes
    /// into the aggregator, anything else is logged against the provider
    /// name and contributes nothing. The fetch runs in its own task so a
    /// panic inside provider code is contained there, and so an abandoned
    /// fetch can never reach the aggregator: only this runner writes, and
    /// only after the fetch came back in time.
    async fn run_provider(
        provider: Arc<dyn PriceProvider>,
        aggregator: Arc<PriceAggregator>,
        fetch_timeout: Duration,
    ) {
        let name = provider.name().to_string();
        debug!("Fetching prices from provider {}", name);

        let mut fetch = tokio::spawn(async move { provider.get_prices().await });

        match timeout(fetch_timeout, &mut fetch).await {
            Ok(Ok(Ok(quotes))) => {
                info!("Fetched {} quotes from provider {}", quotes.len(), name);
                aggregator.set_prices(&name, quotes);
            }
            Ok(Ok(Err(e))) => {
                error!("Failed to fetch prices from provider {}: {}", name, e);
            }
            Ok(Err(join_err)) if join_err.is_panic() => {
                error!("Panic while fetching prices from provider {}", name);
            }
            Ok(Err(join_err)) => {
                error!("Fetch task for provider {} died: {}", name, join_err);
            }
            Err(_) => {
                fetch.abort();
                error!("Provider {} timed out after {:?}", name, fetch_timeout);
            }
        }
    }

    /// Defensive copy of the currently published prices
    ///
    /// Empty until the first successful tick. The returned map is the
    /// caller's own; mutating it does not affect the oracle.
    pub fn get_prices(&self) -> HashMap<CurrencyPair, Decimal> {
        self.published.read().prices.clone()
    }

    /// Wall-clock time of the most recent successful tick
    ///
    /// `None` until the first successful tick. This is wall-clock UTC: a
    /// system clock adjustment can move it backwards.
    pub fn get_last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.published.read().last_sync
    }

    /// Whether the main loop is currently executing
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request shutdown and wait for the main loop to exit
    ///
    /// Idempotent; returns immediately if the oracle is not running.
    pub async fn stop(&self) {
        info!("Stopping oracle");
        self.stop.cancel();

        let mut done = self.done.subscribe();
        while !*done.borrow_and_update() {
            if done.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_interval() {
        let config = OracleConfig {
            tick_interval: Duration::ZERO,
            provider_timeout: Duration::from_millis(100),
        };

        assert!(matches!(
            Oracle::new(config, Vec::new()),
            Err(OracleError::Config(_))
        ));
    }

    #[test]
    fn test_new_oracle_is_idle_and_empty() {
        let oracle = Oracle::new(OracleConfig::default(), Vec::new()).unwrap();

        assert!(!oracle.is_running());
        assert!(oracle.get_prices().is_empty());
        assert!(oracle.get_last_sync_time().is_none());
    }

    #[tokio::test]
    async fn test_stop_before_start_returns_immediately() {
        let oracle = Oracle::new(OracleConfig::default(), Vec::new()).unwrap();
        oracle.stop().await;
        assert!(!oracle.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_is_an_error() {
        let oracle = Arc::new(Oracle::new(OracleConfig::default(), Vec::new()).unwrap());

        let token = CancellationToken::new();
        let first = tokio::spawn(Arc::clone(&oracle).start(token.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = Arc::clone(&oracle).start(token.clone()).await;
        assert!(matches!(second, Err(OracleError::Config(_))));

        oracle.stop().await;
        assert!(first.await.unwrap().is_ok());
    }
}
