use std::{error::Error, fmt, sync::Arc};

use chrono::NaiveDate;
use optchain_model::schema::DATE_FORMAT;

use crate::market::{MarketData, MarketError};

pub mod chain;
pub mod history;

pub use chain::ChainQuery;
pub use history::HistoryQuery;

#[derive(Debug)]
pub enum ControlError {
    InvalidInput(String),
    NoExpirations(String),
    Market(MarketError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::NoExpirations(symbol) => write!(f, "no listed option expirations for {symbol}"),
            Self::Market(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlError {}

impl From<MarketError> for ControlError {
    fn from(err: MarketError) -> Self {
        Self::Market(err)
    }
}

/// Request orchestration over a market-data source.
pub struct OptionsControlPlane<M: MarketData> {
    market: Arc<M>,
}

impl<M: MarketData> Clone for OptionsControlPlane<M> {
    fn clone(&self) -> Self {
        Self {
            market: self.market.clone(),
        }
    }
}

impl<M: MarketData> OptionsControlPlane<M> {
    pub fn new(market: M) -> Self {
        Self::from_arc(Arc::new(market))
    }

    pub const fn from_arc(market: Arc<M>) -> Self {
        Self { market }
    }

    pub fn market(&self) -> &M {
        &self.market
    }
}

/// Trims and uppercases a ticker, rejecting blanks.
pub(crate) fn normalize_symbol(symbol: &str) -> Result<String, ControlError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(ControlError::InvalidInput("symbol is required".to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Parses an optional `YYYY-MM-DD` field; blank values count as absent.
pub(crate) fn parse_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ControlError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ControlError::InvalidInput(format!("{field} must be YYYY-MM-DD, got {value}")))
}
