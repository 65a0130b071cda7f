//! Median reduction across providers
//!
//! Reduces one tick's per-provider quote maps to a single canonical price
//! per currency pair.

use std::collections::HashMap;

use rust_decimal::Decimal;

use oracle_core::CurrencyPair;

use crate::aggregator::ProviderPrices;

/// Compute the per-pair median price across providers
///
/// For each pair reported by at least one provider, the reported prices are
/// stable-sorted in non-decreasing order and the element at index `len / 2`
/// is selected: the true median for an odd number of reports, the
/// upper-middle element for an even number. The upper-middle rule is
/// deliberate; averaging the two middle elements would force a rounding
/// policy onto the result.
///
/// Pure function: identical snapshots always reduce to identical maps.
/// Pairs no provider reported are absent from the output; an empty snapshot
/// yields an empty map.
pub fn compute_median(snapshot: ProviderPrices) -> HashMap<CurrencyPair, Decimal> {
    let mut prices_by_pair: HashMap<CurrencyPair, Vec<Decimal>> = HashMap::new();

    for (_, quotes) in snapshot {
        for (pair, quote) in quotes {
            prices_by_pair.entry(pair).or_default().push(quote.price);
        }
    }

    prices_by_pair
        .into_iter()
        .map(|(pair, mut prices)| {
            prices.sort();
            let median = prices[prices.len() / 2];
            (pair, median)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oracle_core::Quote;
    use rust_decimal_macros::dec;

    fn snapshot_for(pair: &CurrencyPair, prices: &[Decimal]) -> ProviderPrices {
        let mut snapshot = ProviderPrices::new();
        for (i, price) in prices.iter().enumerate() {
            let mut quotes = HashMap::new();
            quotes.insert(
                pair.clone(),
                Quote::new(pair.clone(), *price, Utc::now()).unwrap(),
            );
            snapshot.insert(format!("provider-{}", i), quotes);
        }
        snapshot
    }

    #[test]
    fn test_empty_snapshot_yields_empty_map() {
        assert!(compute_median(ProviderPrices::new()).is_empty());
    }

    #[test]
    fn test_single_provider_single_pair() {
        let pair = CurrencyPair::new("BTC", "USD");
        let medians = compute_median(snapshot_for(&pair, &[dec!(30000)]));

        assert_eq!(medians.len(), 1);
        assert_eq!(medians[&pair], dec!(30000));
    }

    #[test]
    fn test_odd_count_selects_true_median() {
        let pair = CurrencyPair::new("ETH", "USD");
        let medians = compute_median(snapshot_for(&pair, &[dec!(2100), dec!(1900), dec!(2000)]));

        assert_eq!(medians[&pair], dec!(2000));
    }

    #[test]
    fn test_even_count_selects_upper_middle() {
        let pair = CurrencyPair::new("ETH", "USD");
        let medians = compute_median(snapshot_for(
            &pair,
            &[dec!(1800), dec!(1900), dec!(2000), dec!(2100)],
        ));

        // Sorted index 4/2 = 2, never the average of the middle two.
        assert_eq!(medians[&pair], dec!(2000));
    }

    #[test]
    fn test_agreeing_providers_pass_through() {
        let pair = CurrencyPair::new("ATOM", "USD");
        let medians = compute_median(snapshot_for(&pair, &[dec!(11.35), dec!(11.35), dec!(11.35)]));

        assert_eq!(medians[&pair], dec!(11.35));
    }

    #[test]
    fn test_missing_providers_contribute_nothing() {
        let btc = CurrencyPair::new("BTC", "USD");
        let eth = CurrencyPair::new("ETH", "USD");

        let mut snapshot = snapshot_for(&btc, &[dec!(30000), dec!(30100), dec!(30200)]);
        let mut eth_quotes = HashMap::new();
        eth_quotes.insert(
            eth.clone(),
            Quote::new(eth.clone(), dec!(2000), Utc::now()).unwrap(),
        );
        snapshot.insert("eth-only".to_string(), eth_quotes);

        let medians = compute_median(snapshot);
        assert_eq!(medians.len(), 2);
        assert_eq!(medians[&btc], dec!(30100));
        assert_eq!(medians[&eth], dec!(2000));
    }

    #[test]
    fn test_deterministic_for_identical_snapshots() {
        let pair = CurrencyPair::new("BTC", "USD");
        let prices = [dec!(29000), dec!(31000), dec!(30000), dec!(30000)];

        let first = compute_median(snapshot_for(&pair, &prices));
        let second = compute_median(snapshot_for(&pair, &prices));

        assert_eq!(first, second);
        assert_eq!(first[&pair], dec!(30000));
    }
}
