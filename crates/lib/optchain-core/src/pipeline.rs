//! Per-request composition of parsing, quality filtering, and strike selection.
//!
//! Diagnostics are passed in explicitly; the filtering functions themselves
//! stay pure and never log.

use optchain_model::{FilterRequest, FilteredChain};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::parsers::{ChainParseOptions, TradierParser};
use crate::quality::filter_quality;
use crate::strikes::{contains_strike, distinct_strikes, is_usable_price, select_significant_strikes};

/// Observer for pipeline milestones.
pub trait ChainDiagnostics {
    fn contracts_parsed(&self, parsed: usize, skipped: usize);
    fn quality_filtered(&self, before: usize, after: usize);
    fn strikes_selected(&self, percentage: f64, before: usize, after: usize);
    fn degenerate_price(&self, underlying_price: f64);
}

/// Diagnostics that discard every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl ChainDiagnostics for NoopDiagnostics {
    fn contracts_parsed(&self, _parsed: usize, _skipped: usize) {}
    fn quality_filtered(&self, _before: usize, _after: usize) {}
    fn strikes_selected(&self, _percentage: f64, _before: usize, _after: usize) {}
    fn degenerate_price(&self, _underlying_price: f64) {}
}

/// Diagnostics emitted as `tracing` events tagged with the request symbol.
#[derive(Debug, Clone)]
pub struct TracingDiagnostics {
    symbol: String,
}

impl TracingDiagnostics {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl ChainDiagnostics for TracingDiagnostics {
    fn contracts_parsed(&self, parsed: usize, skipped: usize) {
        if skipped > 0 {
            warn!(symbol = %self.symbol, parsed, skipped, "skipped unclassifiable option records");
        } else {
            debug!(symbol = %self.symbol, parsed, "parsed option chain");
        }
    }

    fn quality_filtered(&self, before: usize, after: usize) {
        debug!(symbol = %self.symbol, before, after, "applied quality filter");
    }

    fn strikes_selected(&self, percentage: f64, before: usize, after: usize) {
        info!(symbol = %self.symbol, percentage, before, after, "selected significant strikes");
    }

    fn degenerate_price(&self, underlying_price: f64) {
        warn!(
            symbol = %self.symbol,
            underlying_price,
            "underlying price unavailable; keeping all liquid strikes"
        );
    }
}

/// Reduces a raw chain payload to liquid contracts at significant strikes.
#[must_use]
pub fn build_filtered_chain(
    raw_chain: &Value,
    request: &FilterRequest,
    diagnostics: &dyn ChainDiagnostics,
) -> FilteredChain {
    let parsed = TradierParser::parse_chain(
        raw_chain,
        ChainParseOptions::new().with_greeks(request.include_greeks),
    );
    diagnostics.contracts_parsed(parsed.contracts.len(), parsed.skipped);

    let parsed_count = parsed.contracts.len();
    let liquid = filter_quality(parsed.contracts, request.option_type);
    diagnostics.quality_filtered(parsed_count, liquid.len());

    if !is_usable_price(request.underlying_price) {
        diagnostics.degenerate_price(request.underlying_price);
    }

    let candidates = distinct_strikes(liquid.iter().map(|contract| contract.strike));
    let percentage = request.effective_percentage();
    let significant = select_significant_strikes(request.underlying_price, percentage, &candidates);
    diagnostics.strikes_selected(percentage, candidates.len(), significant.len());

    FilteredChain::new(
        liquid
            .into_iter()
            .filter(|contract| contains_strike(&significant, contract.strike))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use optchain_model::{OptionType, OptionTypeFilter};
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl ChainDiagnostics for Recorder {
        fn contracts_parsed(&self, parsed: usize, skipped: usize) {
            self.events.borrow_mut().push(format!("parsed {parsed} skipped {skipped}"));
        }

        fn quality_filtered(&self, before: usize, after: usize) {
            self.events.borrow_mut().push(format!("quality {before}->{after}"));
        }

        fn strikes_selected(&self, percentage: f64, before: usize, after: usize) {
            self.events
                .borrow_mut()
                .push(format!("strikes@{percentage} {before}->{after}"));
        }

        fn degenerate_price(&self, _underlying_price: f64) {
            self.events.borrow_mut().push("degenerate".to_string());
        }
    }

    fn record(strike: u32, option_type: &str, volume: u64, bid: f64) -> Value {
        json!({
            "symbol": format!("SPY{option_type}{strike}"),
            "strike": strike,
            "option_type": option_type,
            "volume": volume,
            "bid": bid,
            "ask": bid + 0.05,
            "expiration_date": "2025-06-20",
            "greeks": { "delta": 0.5, "gamma": 0.01, "theta": -0.1, "vega": 0.2, "mid_iv": 0.2 }
        })
    }

    fn chain(strikes: impl Iterator<Item = u32>) -> Value {
        let records: Vec<Value> = strikes
            .flat_map(|strike| [record(strike, "call", 10, 1.0), record(strike, "put", 10, 1.0)])
            .collect();
        json!({ "options": { "option": records } })
    }

    #[test]
    fn reference_chain_end_to_end() {
        let request = FilterRequest::new(556.0).with_percentage(10.0);
        let recorder = Recorder::default();
        let result = build_filtered_chain(&chain(500..=610), &request, &recorder);

        assert_eq!(result.len(), 100);
        assert!(result.option.iter().all(|contract| contract.greeks.is_some()));
        assert_eq!(
            recorder.events.into_inner(),
            vec![
                "parsed 222 skipped 0".to_string(),
                "quality 222->222".to_string(),
                "strikes@10 111->50".to_string(),
            ]
        );
    }

    #[test]
    fn illiquid_contracts_never_reach_selection() {
        let payload = json!({ "options": { "option": [
            record(556, "call", 0, 3.0),
            record(556, "put", 25, 0.10),
            record(557, "call", 25, 2.0),
        ] } });
        let request = FilterRequest::new(556.0).with_percentage(10.0);
        let result = build_filtered_chain(&payload, &request, &NoopDiagnostics);

        assert_eq!(result.len(), 1);
        assert!((result.option[0].strike - 557.0).abs() < f64::EPSILON);
    }

    #[test]
    fn side_filter_and_greeks_flag_apply() {
        let request = FilterRequest::new(556.0)
            .with_percentage(1.0)
            .with_option_type(OptionTypeFilter::Put)
            .with_greeks(false);
        let result = build_filtered_chain(&chain(550..=560), &request, &NoopDiagnostics);

        assert_eq!(result.len(), 10);
        assert!(
            result
                .option
                .iter()
                .all(|contract| contract.option_type == OptionType::Put && contract.greeks.is_none())
        );
    }

    #[test]
    fn default_percentage_is_used_when_absent() {
        let recorder = Recorder::default();
        let _ = build_filtered_chain(&chain(500..=510), &FilterRequest::new(505.0), &recorder);
        assert!(
            recorder
                .events
                .borrow()
                .iter()
                .any(|event| event.starts_with("strikes@20 "))
        );
    }

    #[test]
    fn zero_price_keeps_all_liquid_contracts() {
        let recorder = Recorder::default();
        let result = build_filtered_chain(&chain(500..=610), &FilterRequest::new(0.0), &recorder);

        assert_eq!(result.len(), 222);
        assert!(recorder.events.borrow().contains(&"degenerate".to_string()));
    }

    #[test]
    fn empty_chain_is_empty_payload() {
        let request = FilterRequest::new(556.0);
        let result = build_filtered_chain(&json!({ "options": null }), &request, &NoopDiagnostics);
        assert!(result.is_empty());
    }
}
