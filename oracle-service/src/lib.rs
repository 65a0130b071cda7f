//! Aggregation service for the Price Oracle
//!
//! This crate provides the oracle core: the per-tick accumulator, the
//! median reduction, and the periodic fan-out/fan-in loop that polls every
//! provider and publishes canonical per-pair prices.

pub mod aggregator;
pub mod median;
pub mod oracle;

pub use aggregator::{PriceAggregator, ProviderPrices};
pub use median::compute_median;
pub use oracle::{Oracle, OracleConfig};
