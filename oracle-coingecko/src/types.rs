//! CoinGecko API response types and symbol mapping

use rust_decimal::Decimal;
use std::collections::HashMap;

/// Response from `/simple/price`: coin id -> quote currency -> price
///
/// ```json
/// {
///   "bitcoin": { "usd": 30000.0 },
///   "cosmos": { "usd": 11.35 }
/// }
/// ```
pub type SimplePriceResponse = HashMap<String, HashMap<String, Decimal>>;

/// Map an upper-case base symbol to its CoinGecko coin id
///
/// CoinGecko keys prices by coin id rather than ticker symbol. Symbols not
/// listed here can be supplied per-client via
/// [`CoinGeckoClient::with_coin_id`](crate::client::CoinGeckoClient::with_coin_id).
pub fn coin_id_for(symbol: &str) -> Option<&'static str> {
    match symbol {
        "BTC" => Some("bitcoin"),
        "ETH" => Some("ethereum"),
        "SOL" => Some("solana"),
        "ATOM" => Some("cosmos"),
        "OSMO" => Some("osmosis"),
        "XRP" => Some("ripple"),
        "ADA" => Some("cardano"),
        "DOGE" => Some("dogecoin"),
        "DOT" => Some("polkadot"),
        "AVAX" => Some("avalanche-2"),
        "MATIC" => Some("matic-network"),
        "LINK" => Some("chainlink"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols_resolve() {
        assert_eq!(coin_id_for("BTC"), Some("bitcoin"));
        assert_eq!(coin_id_for("ATOM"), Some("cosmos"));
    }

    #[test]
    fn test_unknown_symbol_is_none() {
        assert_eq!(coin_id_for("NOPE"), None);
    }
}
