//! Coinbase API response types

use rust_decimal::Decimal;
use serde::Deserialize;

/// Response envelope from `/v2/prices/{pair}/spot`
///
/// ```json
/// { "data": { "base": "BTC", "currency": "USD", "amount": "30000.00" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SpotPriceResponse {
    pub data: SpotPrice,
}

/// A single spot price
#[derive(Debug, Clone, Deserialize)]
pub struct SpotPrice {
    /// Base asset symbol, e.g. "BTC"
    pub base: String,
    /// Quote currency, e.g. "USD"
    pub currency: String,
    /// Price as a decimal string
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_spot_price_response() {
        let response: SpotPriceResponse = serde_json::from_str(
            r#"{ "data": { "base": "BTC", "currency": "USD", "amount": "30000.12" } }"#,
        )
        .unwrap();

        assert_eq!(response.data.base, "BTC");
        assert_eq!(response.data.currency, "USD");
        assert_eq!(response.data.amount, dec!(30000.12));
    }
}
