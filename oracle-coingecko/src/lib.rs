//! CoinGecko integration for the Price Oracle
//!
//! This crate provides a [`PriceProvider`](oracle_core::PriceProvider)
//! backed by the CoinGecko simple-price REST API.

pub mod client;
pub mod types;

pub use client::CoinGeckoClient;
