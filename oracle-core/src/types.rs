//! Domain types for the price oracle
//!
//! A [`CurrencyPair`] identifies an exchange rate; a [`Quote`] is a single
//! price observation for a pair from a single provider.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OracleError;

/// An ordered (base, quote) currency pair, e.g. BTC/USD
///
/// Symbols are canonicalized to upper-case at construction; equality and
/// hashing are on the canonical form. Serialized as the string
/// `"BASE/QUOTE"` so pairs can be used as JSON map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    /// Create a new pair, canonicalizing both symbols to upper-case
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().trim().to_uppercase(),
            quote: quote.into().trim().to_uppercase(),
        }
    }

    /// The base symbol (the asset being priced)
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The quote symbol (the denominating currency)
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((base, quote)) if !base.trim().is_empty() && !quote.trim().is_empty() => {
                Ok(CurrencyPair::new(base, quote))
            }
            _ => Err(OracleError::parse(format!(
                "invalid currency pair: {:?} (expected BASE/QUOTE)",
                s
            ))),
        }
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = OracleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.to_string()
    }
}

/// A single price observation from a single provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// The pair this price is for
    pub pair: CurrencyPair,
    /// The observed price; always non-negative
    pub price: Decimal,
    /// Wall-clock time at which the price was observed
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Create a quote, rejecting negative prices
    pub fn new(
        pair: CurrencyPair,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, OracleError> {
        if price < Decimal::ZERO {
            return Err(OracleError::invalid_price(format!(
                "negative price {} for {}",
                price, pair
            )));
        }

        Ok(Self {
            pair,
            price,
            timestamp,
        })
    }
}
