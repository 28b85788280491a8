//! Upstream market-data interfaces and the brokerage HTTP implementation.
//!
//! The market layer only moves JSON; interpretation happens in `parsers`.

pub mod tradier;

use std::future::Future;
use std::{error::Error, fmt};

use chrono::NaiveDate;
use optchain_model::{HistoryInterval, SessionFilter};
use serde_json::Value;

pub use tradier::{TradierClient, TradierConfig};

/// Query for historical price bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    pub interval: HistoryInterval,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub session_filter: SessionFilter,
}

/// Source of raw quote, chain, and history payloads.
pub trait MarketData: Send + Sync + 'static {
    /// Fetches the quotes payload for `symbol`.
    fn quote(&self, symbol: &str) -> impl Future<Output = MarketResult<Value>> + Send;

    /// Fetches the option chain payload for one expiration.
    fn option_chain(
        &self,
        symbol: &str,
        expiration: NaiveDate,
        greeks: bool,
    ) -> impl Future<Output = MarketResult<Value>> + Send;

    /// Fetches the listed expiration dates for `symbol`.
    fn option_expirations(&self, symbol: &str)
    -> impl Future<Output = MarketResult<Value>> + Send;

    /// Fetches historical bars; the payload is returned untouched.
    fn history(&self, request: &HistoryRequest) -> impl Future<Output = MarketResult<Value>> + Send;
}

pub type MarketResult<T> = Result<T, MarketError>;

#[derive(Debug)]
pub enum MarketError {
    /// Upstream replied with a non-success status.
    Status {
        endpoint: &'static str,
        status: u16,
        status_text: String,
        params: String,
        body: String,
    },
    Transport(reqwest::Error),
    InvalidUrl(url::ParseError),
    InvalidConfig(String),
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status {
                endpoint,
                status,
                status_text,
                params,
                body,
            } => {
                write!(f, "{endpoint} failed with {status} {status_text} ({params})")?;
                if !body.is_empty() {
                    write!(f, ": {body}")?;
                }
                Ok(())
            }
            Self::Transport(err) => write!(f, "market data request failed: {err}"),
            Self::InvalidUrl(err) => write!(f, "invalid market data url: {err}"),
            Self::InvalidConfig(message) => write!(f, "invalid market data config: {message}"),
        }
    }
}

impl Error for MarketError {}

impl From<reqwest::Error> for MarketError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<url::ParseError> for MarketError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err)
    }
}
