use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use optchain_model::schema::{
    DATE_FORMAT,
    PATH_HISTORY,
    PATH_OPTION_CHAINS,
    PATH_OPTION_EXPIRATIONS,
    PATH_QUOTES,
    TRADIER_API_URL,
    TRADIER_SANDBOX_URL,
};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{HistoryRequest, MarketData, MarketError, MarketResult};

/// Connection settings for the brokerage REST API.
#[derive(Clone)]
pub struct TradierConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Option<Duration>,
}

impl TradierConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: TRADIER_API_URL.to_string(),
            token: token.into(),
            timeout: Some(Duration::from_secs(30)),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_sandbox(self) -> Self {
        self.with_base_url(TRADIER_SANDBOX_URL)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TradierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradierConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the brokerage market-data endpoints.
#[derive(Clone)]
pub struct TradierClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl TradierClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    /// Returns `MarketError` if the token is blank, the base URL is invalid, or
    /// the HTTP client cannot be built.
    pub fn new(config: TradierConfig) -> MarketResult<Self> {
        let token = config.token.trim().to_string();
        if token.is_empty() {
            return Err(MarketError::InvalidConfig("api token is required".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Url::parse(config.base_url.trim_end_matches('/'))?,
            token,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the base URL and appends `params` as a query string.
    ///
    /// # Errors
    /// Returns `MarketError::InvalidUrl` if `path` cannot be joined.
    pub fn endpoint(&self, path: &str, params: &[(&str, String)]) -> MarketResult<Url> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json(&self, path: &'static str, params: &[(&str, String)]) -> MarketResult<Value> {
        let url = self.endpoint(path, params)?;
        let query = url.query().unwrap_or_default().to_string();
        debug!(endpoint = path, %query, "market data request");

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(MarketError::Status {
            endpoint: path,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            params: query,
            body: body.trim().to_string(),
        })
    }
}

impl fmt::Debug for TradierClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradierClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl MarketData for TradierClient {
    async fn quote(&self, symbol: &str) -> MarketResult<Value> {
        self.get_json(PATH_QUOTES, &[("symbols", symbol.to_string())])
            .await
    }

    async fn option_chain(
        &self,
        symbol: &str,
        expiration: NaiveDate,
        greeks: bool,
    ) -> MarketResult<Value> {
        self.get_json(
            PATH_OPTION_CHAINS,
            &[
                ("symbol", symbol.to_string()),
                ("expiration", expiration.format(DATE_FORMAT).to_string()),
                ("greeks", greeks.to_string()),
            ],
        )
        .await
    }

    async fn option_expirations(&self, symbol: &str) -> MarketResult<Value> {
        self.get_json(PATH_OPTION_EXPIRATIONS, &[("symbol", symbol.to_string())])
            .await
    }

    async fn history(&self, request: &HistoryRequest) -> MarketResult<Value> {
        self.get_json(PATH_HISTORY, &history_params(request)).await
    }
}

fn history_params(request: &HistoryRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", request.symbol.clone()),
        ("interval", request.interval.as_str().to_string()),
    ];
    if let Some(start) = request.start {
        params.push(("start", start.format(DATE_FORMAT).to_string()));
    }
    if let Some(end) = request.end {
        params.push(("end", end.format(DATE_FORMAT).to_string()));
    }
    params.push(("session_filter", request.session_filter.as_str().to_string()));
    params
}
