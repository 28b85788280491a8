use optchain_model::{HistoryInterval, SessionFilter};
use serde_json::Value;

use crate::market::{HistoryRequest, MarketData};

use super::{ControlError, OptionsControlPlane, normalize_symbol, parse_date};

/// Caller input for historical price bars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub symbol: String,
    pub interval: HistoryInterval,
    pub start: Option<String>,
    pub end: Option<String>,
    pub session_filter: SessionFilter,
}

impl HistoryQuery {
    /// Validates the query into an upstream request.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` for a blank symbol, malformed
    /// dates, or a start date after the end date.
    pub fn into_request(self) -> Result<HistoryRequest, ControlError> {
        let symbol = normalize_symbol(&self.symbol)?;
        let start = parse_date("start", self.start.as_deref())?;
        let end = parse_date("end", self.end.as_deref())?;
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(ControlError::InvalidInput(format!(
                "start ({start}) must not be after end ({end})"
            )));
        }

        Ok(HistoryRequest {
            symbol,
            interval: self.interval,
            start,
            end,
            session_filter: self.session_filter,
        })
    }
}

impl<M: MarketData> OptionsControlPlane<M> {
    /// Fetches historical bars and returns the upstream payload unmodified.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid input or any upstream failure.
    pub async fn historical_prices(&self, query: HistoryQuery) -> Result<Value, ControlError> {
        let request = query.into_request()?;
        Ok(self.market.history(&request).await?)
    }
}
