use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::{DEFAULT_STRIKE_PERCENTAGE, MAX_STRIKE_PERCENTAGE, MIN_STRIKE_PERCENTAGE};

/// Contract side of an option.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            _ => Err(UnknownVariant::new("option type", value)),
        }
    }
}

/// Which contract sides a chain request wants back.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionTypeFilter {
    Call,
    Put,
    #[default]
    Both,
}

impl OptionTypeFilter {
    /// Returns true when a contract of `option_type` satisfies this filter.
    #[must_use]
    pub fn accepts(self, option_type: OptionType) -> bool {
        match self {
            Self::Call => option_type == OptionType::Call,
            Self::Put => option_type == OptionType::Put,
            Self::Both => true,
        }
    }
}

/// Sensitivity measures reported alongside a contract.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_volatility: Option<f64>,
}

/// A single listed option, normalized from the upstream chain payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionContract {
    pub symbol: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<f64>,
    pub volume: u64,
    pub bid: f64,
    pub ask: f64,
    pub underlying: String,
    pub strike: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percentage: Option<f64>,
    pub open_interest: u64,
    pub expiration_date: String,
    pub option_type: OptionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<Greeks>,
}

/// Response payload for a filtered options chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilteredChain {
    pub option: Vec<OptionContract>,
}

impl FilteredChain {
    #[must_use]
    pub const fn new(option: Vec<OptionContract>) -> Self {
        Self { option }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.option.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.option.is_empty()
    }
}

/// Inputs that drive quality filtering and strike selection for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterRequest {
    pub underlying_price: f64,
    pub percentage: Option<f64>,
    pub option_type: OptionTypeFilter,
    pub include_greeks: bool,
}

impl FilterRequest {
    #[must_use]
    pub const fn new(underlying_price: f64) -> Self {
        Self {
            underlying_price,
            percentage: None,
            option_type: OptionTypeFilter::Both,
            include_greeks: true,
        }
    }

    #[must_use]
    pub const fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    #[must_use]
    pub const fn with_option_type(mut self, option_type: OptionTypeFilter) -> Self {
        self.option_type = option_type;
        self
    }

    #[must_use]
    pub const fn with_greeks(mut self, include_greeks: bool) -> Self {
        self.include_greeks = include_greeks;
        self
    }

    /// Percentage radius actually used for selection.
    ///
    /// Missing or `NaN` values fall back to the default; everything else is
    /// clamped into `[0, 100]`.
    #[must_use]
    pub fn effective_percentage(&self) -> f64 {
        match self.percentage {
            Some(value) if !value.is_nan() => {
                value.clamp(MIN_STRIKE_PERCENTAGE, MAX_STRIKE_PERCENTAGE)
            }
            _ => DEFAULT_STRIKE_PERCENTAGE,
        }
    }
}

/// Bar size for historical price requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryInterval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl HistoryInterval {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Trading session scope for historical price requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionFilter {
    #[default]
    All,
    Open,
}

impl SessionFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Open => "open",
        }
    }
}

/// Error returned when a textual enum value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(greeks: Option<Greeks>) -> OptionContract {
        OptionContract {
            symbol: "SPY250620C00550000".to_string(),
            description: "SPY Jun 20 2025 $550.00 Call".to_string(),
            last: None,
            volume: 10,
            bid: 1.25,
            ask: 1.30,
            underlying: "SPY".to_string(),
            strike: 550.0,
            change_percentage: None,
            open_interest: 100,
            expiration_date: "2025-06-20".to_string(),
            option_type: OptionType::Call,
            greeks,
        }
    }

    #[test]
    fn option_type_parses_case_insensitively() {
        assert_eq!("CALL".parse::<OptionType>(), Ok(OptionType::Call));
        assert_eq!(" put ".parse::<OptionType>(), Ok(OptionType::Put));
        assert!("straddle".parse::<OptionType>().is_err());
    }

    #[test]
    fn type_filter_accepts_matching_sides() {
        assert!(OptionTypeFilter::Both.accepts(OptionType::Put));
        assert!(OptionTypeFilter::Call.accepts(OptionType::Call));
        assert!(!OptionTypeFilter::Call.accepts(OptionType::Put));
        assert!(!OptionTypeFilter::Put.accepts(OptionType::Call));
    }

    #[test]
    fn effective_percentage_defaults_and_clamps() {
        let request = FilterRequest::new(100.0);
        assert!((request.effective_percentage() - DEFAULT_STRIKE_PERCENTAGE).abs() < f64::EPSILON);
        assert!((request.with_percentage(150.0).effective_percentage() - 100.0).abs() < f64::EPSILON);
        assert!(request.with_percentage(-5.0).effective_percentage().abs() < f64::EPSILON);
        assert!(
            (request.with_percentage(f64::NAN).effective_percentage() - DEFAULT_STRIKE_PERCENTAGE)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn absent_optionals_are_omitted_from_json() {
        let value = serde_json::to_value(contract(None)).expect("contract should serialize");
        assert!(value.get("greeks").is_none());
        assert!(value.get("last").is_none());
        assert_eq!(value["option_type"], "call");
    }

    #[test]
    fn greeks_serialize_when_present() {
        let greeks = Greeks {
            delta: 0.5,
            gamma: 0.01,
            theta: -0.2,
            vega: 0.3,
            implied_volatility: Some(0.18),
        };
        let value = serde_json::to_value(FilteredChain::new(vec![contract(Some(greeks))]))
            .expect("chain should serialize");
        assert_eq!(value["option"][0]["greeks"]["implied_volatility"], 0.18);
    }
}
