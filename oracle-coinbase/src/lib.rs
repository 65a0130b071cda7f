//! Coinbase integration for the Price Oracle
//!
//! This crate provides a [`PriceProvider`](oracle_core::PriceProvider)
//! backed by the public Coinbase spot-price REST API.

pub mod client;
pub mod types;

pub use client::CoinbaseClient;
