//! Core types for the Price Oracle
//!
//! This crate defines the shared data structures used across the oracle,
//! including currency pairs, price quotes, the provider abstraction, and
//! the common error type.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{OracleError, OracleResult};
pub use provider::PriceProvider;
pub use types::{CurrencyPair, Quote};
