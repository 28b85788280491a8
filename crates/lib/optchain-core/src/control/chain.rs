use chrono::{Local, NaiveDate};
use optchain_model::{FilterRequest, FilteredChain, OptionTypeFilter};
use tracing::debug;

use crate::market::MarketData;
use crate::parsers::TradierParser;
use crate::pipeline::{ChainDiagnostics, build_filtered_chain};

use super::{ControlError, OptionsControlPlane, normalize_symbol, parse_date};

/// Caller input for a filtered options chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainQuery {
    pub symbol: String,
    pub expiration: Option<String>,
    pub greeks: bool,
    pub option_type: OptionTypeFilter,
    pub strike_percentage: Option<f64>,
}

impl ChainQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            expiration: None,
            greeks: true,
            option_type: OptionTypeFilter::Both,
            strike_percentage: None,
        }
    }

    #[must_use]
    pub fn with_expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    #[must_use]
    pub const fn with_greeks(mut self, greeks: bool) -> Self {
        self.greeks = greeks;
        self
    }

    #[must_use]
    pub const fn with_option_type(mut self, option_type: OptionTypeFilter) -> Self {
        self.option_type = option_type;
        self
    }

    #[must_use]
    pub const fn with_strike_percentage(mut self, strike_percentage: f64) -> Self {
        self.strike_percentage = Some(strike_percentage);
        self
    }
}

impl<M: MarketData> OptionsControlPlane<M> {
    /// Fetches a chain and reduces it to liquid contracts at significant strikes.
    ///
    /// The quote is fetched before the chain. Without an explicit expiration
    /// the nearest listed expiration on or after today is used.
    ///
    /// # Errors
    /// Returns `ControlError` for invalid input, a symbol with no listed
    /// expirations, or any upstream failure.
    pub async fn find_options_chain<D>(
        &self,
        query: ChainQuery,
        diagnostics: &D,
    ) -> Result<FilteredChain, ControlError>
    where
        D: ChainDiagnostics + Sync,
    {
        let symbol = normalize_symbol(&query.symbol)?;
        let expiration = match parse_date("expiration", query.expiration.as_deref())? {
            Some(expiration) => expiration,
            None => self.nearest_expiration(&symbol).await?,
        };

        let quote = self.market.quote(&symbol).await?;
        let underlying_price = TradierParser::parse_underlying_price(&quote);
        debug!(%symbol, %expiration, underlying_price, "resolved chain request");

        let raw_chain = self
            .market
            .option_chain(&symbol, expiration, query.greeks)
            .await?;

        let mut request = FilterRequest::new(underlying_price)
            .with_option_type(query.option_type)
            .with_greeks(query.greeks);
        request.percentage = query.strike_percentage;

        Ok(build_filtered_chain(&raw_chain, &request, diagnostics))
    }

    async fn nearest_expiration(&self, symbol: &str) -> Result<NaiveDate, ControlError> {
        let payload = self.market.option_expirations(symbol).await?;
        let listed = TradierParser::parse_expirations(&payload);
        // Host-local calendar date; the exchange timezone is not applied.
        pick_expiration(&listed, Local::now().date_naive())
            .ok_or_else(|| ControlError::NoExpirations(symbol.to_string()))
    }
}

/// Earliest date on or after `today`, else the latest listed date.
fn pick_expiration(sorted: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    sorted
        .iter()
        .copied()
        .find(|date| *date >= today)
        .or_else(|| sorted.last().copied())
}
