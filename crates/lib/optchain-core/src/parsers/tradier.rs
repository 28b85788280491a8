use chrono::NaiveDate;
use optchain_model::schema::DATE_FORMAT;
use optchain_model::{Greeks, OptionContract, OptionType};
use serde_json::{Map, Value};

/// Options for normalizing an upstream option chain payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainParseOptions {
    pub include_greeks: bool,
}

impl ChainParseOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_greeks: false,
        }
    }

    #[must_use]
    pub const fn with_greeks(mut self, include_greeks: bool) -> Self {
        self.include_greeks = include_greeks;
        self
    }
}

/// Output from normalizing an option chain payload.
#[derive(Debug, Clone, Default)]
pub struct ChainParseOutput {
    pub contracts: Vec<OptionContract>,
    /// Records that could not form a contract (unknown side or non-positive strike).
    pub skipped: usize,
}

/// Total parser for brokerage market-data payloads.
///
/// Shape drift never produces an error: missing numerics become zero, missing
/// optionals stay absent, and records that cannot be classified are skipped.
pub struct TradierParser;

impl TradierParser {
    /// Normalizes a `{ options: { option: OneOrMany<record> } }` payload.
    #[must_use]
    pub fn parse_chain(payload: &Value, options: ChainParseOptions) -> ChainParseOutput {
        let mut output = ChainParseOutput::default();
        let Some(records) = payload.get("options").and_then(|options| options.get("option"))
        else {
            return output;
        };

        for record in one_or_many(records) {
            match parse_contract(record, options) {
                Some(contract) => output.contracts.push(contract),
                None => output.skipped += 1,
            }
        }
        output
    }

    /// Extracts the first quote's `last` price from a quotes payload, or 0.
    #[must_use]
    pub fn parse_underlying_price(payload: &Value) -> f64 {
        payload
            .get("quotes")
            .and_then(|quotes| quotes.get("quote"))
            .and_then(|quote| one_or_many(quote).into_iter().next())
            .and_then(|quote| number(quote.get("last")))
            .unwrap_or_default()
    }

    /// Extracts listed expiration dates, sorted ascending.
    #[must_use]
    pub fn parse_expirations(payload: &Value) -> Vec<NaiveDate> {
        let Some(dates) = payload
            .get("expirations")
            .and_then(|expirations| expirations.get("date"))
        else {
            return Vec::new();
        };

        // A lone expiration arrives as a bare string rather than a list.
        let listed: Vec<&Value> = match dates {
            Value::Array(items) => items.iter().collect(),
            Value::String(_) => vec![dates],
            _ => Vec::new(),
        };

        let mut parsed: Vec<NaiveDate> = listed
            .into_iter()
            .filter_map(Value::as_str)
            .filter_map(|date| NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok())
            .collect();
        parsed.sort_unstable();
        parsed.dedup();
        parsed
    }
}

fn parse_contract(record: &Value, options: ChainParseOptions) -> Option<OptionContract> {
    let fields = record.as_object()?;
    let option_type = text(fields, "option_type").parse::<OptionType>().ok()?;
    let strike = number(fields.get("strike")).filter(|strike| *strike > 0.0)?;

    let greeks = if options.include_greeks {
        fields
            .get("greeks")
            .and_then(Value::as_object)
            .map(parse_greeks)
    } else {
        None
    };

    Some(OptionContract {
        symbol: text(fields, "symbol"),
        description: text(fields, "description"),
        last: number(fields.get("last")),
        volume: count(fields.get("volume")),
        bid: non_negative(fields.get("bid")),
        ask: non_negative(fields.get("ask")),
        underlying: text(fields, "underlying"),
        strike,
        change_percentage: number(fields.get("change_percentage")),
        open_interest: count(fields.get("open_interest")),
        expiration_date: text(fields, "expiration_date"),
        option_type,
        greeks,
    })
}

fn parse_greeks(fields: &Map<String, Value>) -> Greeks {
    Greeks {
        delta: number(fields.get("delta")).unwrap_or_default(),
        gamma: number(fields.get("gamma")).unwrap_or_default(),
        theta: number(fields.get("theta")).unwrap_or_default(),
        vega: number(fields.get("vega")).unwrap_or_default(),
        implied_volatility: number(fields.get("mid_iv"))
            .or_else(|| number(fields.get("smv_vol"))),
    }
}

/// Treats a single object as a one-element list; anything that is neither is empty.
fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

/// Reads a finite number from a JSON number or numeric string.
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn non_negative(value: Option<&Value>) -> f64 {
    number(value).map_or(0.0, |parsed| parsed.max(0.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: Option<&Value>) -> u64 {
    if let Some(exact) = value.and_then(Value::as_u64) {
        return exact;
    }
    number(value).map_or(0, |parsed| parsed.max(0.0).trunc() as u64)
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(strike: f64, option_type: &str) -> Value {
        json!({
            "symbol": format!("SPY-{option_type}-{strike}"),
            "description": "SPY test contract",
            "last": 4.2,
            "volume": 120,
            "bid": 4.1,
            "ask": 4.3,
            "underlying": "SPY",
            "strike": strike,
            "change_percentage": -1.5,
            "open_interest": 9000,
            "expiration_date": "2025-06-20",
            "option_type": option_type,
            "greeks": {
                "delta": 0.52,
                "gamma": 0.011,
                "theta": -0.31,
                "vega": 0.44,
                "mid_iv": 0.17,
                "smv_vol": 0.18
            }
        })
    }

    #[test]
    fn quote_price_accepts_one_or_many() {
        let single = json!({ "quotes": { "quote": { "symbol": "SPY", "last": 556.12 } } });
        let many = json!({ "quotes": { "quote": [{ "last": 12.5 }, { "last": 99.0 }] } });
        assert!((TradierParser::parse_underlying_price(&single) - 556.12).abs() < 1e-9);
        assert!((TradierParser::parse_underlying_price(&many) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn quote_price_defaults_to_zero() {
        let unmatched = json!({ "quotes": { "unmatched_symbols": { "symbol": "NOPE" } } });
        let null_last = json!({ "quotes": { "quote": { "last": null } } });
        assert!(TradierParser::parse_underlying_price(&unmatched).abs() < f64::EPSILON);
        assert!(TradierParser::parse_underlying_price(&null_last).abs() < f64::EPSILON);
        assert!(TradierParser::parse_underlying_price(&json!("garbage")).abs() < f64::EPSILON);
    }

    #[test]
    fn chain_maps_typed_fields() {
        let payload = json!({ "options": { "option": [record(550.0, "call"), record(550.0, "put")] } });
        let output = TradierParser::parse_chain(&payload, ChainParseOptions::new().with_greeks(true));

        assert_eq!(output.skipped, 0);
        assert_eq!(output.contracts.len(), 2);
        let call = &output.contracts[0];
        assert_eq!(call.option_type, OptionType::Call);
        assert_eq!(call.volume, 120);
        assert_eq!(call.open_interest, 9000);
        assert_eq!(call.expiration_date, "2025-06-20");
        let greeks = call.greeks.expect("greeks should be attached");
        assert_eq!(greeks.implied_volatility, Some(0.17));
    }

    #[test]
    fn greeks_are_omitted_unless_requested() {
        let payload = json!({ "options": { "option": record(550.0, "call") } });
        let output = TradierParser::parse_chain(&payload, ChainParseOptions::new());
        assert_eq!(output.contracts.len(), 1);
        assert!(output.contracts[0].greeks.is_none());
    }

    #[test]
    fn missing_greeks_stay_absent_when_requested() {
        let mut single = record(550.0, "put");
        single
            .as_object_mut()
            .expect("record is an object")
            .remove("greeks");
        let payload = json!({ "options": { "option": single } });
        let output = TradierParser::parse_chain(&payload, ChainParseOptions::new().with_greeks(true));
        assert!(output.contracts[0].greeks.is_none());
    }

    #[test]
    fn loose_numerics_are_coerced() {
        let payload = json!({ "options": { "option": {
            "symbol": "X",
            "strike": "42.5",
            "option_type": "PUT",
            "volume": "17",
            "bid": -1.0,
            "ask": "n/a",
            "last": null,
            "open_interest": 3.9
        } } });
        let output = TradierParser::parse_chain(&payload, ChainParseOptions::new());
        let contract = &output.contracts[0];
        assert!((contract.strike - 42.5).abs() < f64::EPSILON);
        assert_eq!(contract.option_type, OptionType::Put);
        assert_eq!(contract.volume, 17);
        assert_eq!(contract.open_interest, 3);
        assert!(contract.bid.abs() < f64::EPSILON);
        assert!(contract.ask.abs() < f64::EPSILON);
        assert!(contract.last.is_none());
        assert!(contract.description.is_empty());
    }

    #[test]
    fn unclassifiable_records_are_skipped() {
        let payload = json!({ "options": { "option": [
            record(550.0, "call"),
            record(0.0, "call"),
            record(560.0, "straddle"),
            "not-an-object"
        ] } });
        let output = TradierParser::parse_chain(&payload, ChainParseOptions::new());
        assert_eq!(output.contracts.len(), 1);
        assert_eq!(output.skipped, 3);
    }

    #[test]
    fn absent_or_null_chain_is_empty() {
        for payload in [json!({}), json!({ "options": null }), json!({ "options": { "option": null } })] {
            let output = TradierParser::parse_chain(&payload, ChainParseOptions::new());
            assert!(output.contracts.is_empty());
            assert_eq!(output.skipped, 0);
        }
    }

    #[test]
    fn expirations_parse_sorted() {
        let many = json!({ "expirations": { "date": ["2025-07-18", "2025-06-20", "bogus", "2025-06-20"] } });
        let single = json!({ "expirations": { "date": "2025-06-20" } });
        let none = json!({ "expirations": null });

        let parsed = TradierParser::parse_expirations(&many);
        assert_eq!(
            parsed,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 20).expect("valid date"),
                NaiveDate::from_ymd_opt(2025, 7, 18).expect("valid date"),
            ]
        );
        assert_eq!(
            TradierParser::parse_expirations(&single),
            vec![NaiveDate::from_ymd_opt(2025, 6, 20).expect("valid date")]
        );
        assert!(TradierParser::parse_expirations(&none).is_empty());
    }

    #[test]
    fn single_expiration_string_is_one_date() {
        let single = json!({ "expirations": { "date": " 2025-06-20 " } });
        let object = json!({ "expirations": { "date": { "value": "2025-06-20" } } });

        assert_eq!(
            TradierParser::parse_expirations(&single),
            vec![NaiveDate::from_ymd_opt(2025, 6, 20).expect("valid date")]
        );
        assert!(TradierParser::parse_expirations(&object).is_empty());
    }
}
