//! Liquidity and contract-side filtering applied before strike selection.

use optchain_model::schema::MIN_QUOTED_PRICE;
use optchain_model::{OptionContract, OptionTypeFilter};

/// Returns true when a contract is traded and quoted on both sides.
#[must_use]
pub fn is_liquid(contract: &OptionContract) -> bool {
    contract.volume > 0 && contract.bid > MIN_QUOTED_PRICE && contract.ask > MIN_QUOTED_PRICE
}

/// Keeps contracts of the requested side that pass [`is_liquid`].
#[must_use]
pub fn filter_quality(
    contracts: Vec<OptionContract>,
    option_type: OptionTypeFilter,
) -> Vec<OptionContract> {
    contracts
        .into_iter()
        .filter(|contract| option_type.accepts(contract.option_type) && is_liquid(contract))
        .collect()
}

#[cfg(test)]
mod tests {
    use optchain_model::OptionType;

    use super::*;

    fn contract(option_type: OptionType, volume: u64, bid: f64, ask: f64) -> OptionContract {
        OptionContract {
            symbol: format!("TEST{option_type}{volume}"),
            description: String::new(),
            last: Some(1.0),
            volume,
            bid,
            ask,
            underlying: "TEST".to_string(),
            strike: 100.0,
            change_percentage: None,
            open_interest: 0,
            expiration_date: "2025-01-17".to_string(),
            option_type,
            greeks: None,
        }
    }

    #[test]
    fn zero_volume_is_dropped() {
        let kept = filter_quality(
            vec![contract(OptionType::Call, 0, 2.0, 2.1)],
            OptionTypeFilter::Both,
        );
        assert!(kept.is_empty());
    }

    #[test]
    fn quotes_at_the_threshold_are_dropped() {
        let kept = filter_quality(
            vec![
                contract(OptionType::Call, 5, 0.10, 0.50),
                contract(OptionType::Call, 6, 0.50, 0.10),
                contract(OptionType::Call, 7, 0.11, 0.11),
            ],
            OptionTypeFilter::Both,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].volume, 7);
    }

    #[test]
    fn side_filter_is_exact() {
        let chain = vec![
            contract(OptionType::Call, 1, 1.0, 1.1),
            contract(OptionType::Put, 2, 1.0, 1.1),
        ];

        let calls = filter_quality(chain.clone(), OptionTypeFilter::Call);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].option_type, OptionType::Call);

        let puts = filter_quality(chain.clone(), OptionTypeFilter::Put);
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].option_type, OptionType::Put);

        assert_eq!(filter_quality(chain, OptionTypeFilter::Both).len(), 2);
    }
}
