use optchain_core::control::HistoryQuery;
use optchain_core::market::MarketData;
use optchain_model::{HistoryInterval, SessionFilter};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::OptionsMcp;
use crate::helpers;

/// Bar size accepted by `historical-prices`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntervalParam {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl From<IntervalParam> for HistoryInterval {
    fn from(value: IntervalParam) -> Self {
        match value {
            IntervalParam::Daily => Self::Daily,
            IntervalParam::Weekly => Self::Weekly,
            IntervalParam::Monthly => Self::Monthly,
        }
    }
}

/// Session scope accepted by `historical-prices`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionFilterParam {
    #[default]
    All,
    Open,
}

impl From<SessionFilterParam> for SessionFilter {
    fn from(value: SessionFilterParam) -> Self {
        match value {
            SessionFilterParam::All => Self::All,
            SessionFilterParam::Open => Self::Open,
        }
    }
}

/// Parameters for fetching historical price bars.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HistoricalPricesParams {
    /// Ticker to fetch bars for.
    pub symbol: String,
    /// `daily`, `weekly`, or `monthly`. Defaults to `daily`.
    pub interval: Option<IntervalParam>,
    /// First date as `YYYY-MM-DD`.
    pub start: Option<String>,
    /// Last date as `YYYY-MM-DD`.
    pub end: Option<String>,
    /// `all` or `open`. Defaults to `all`.
    pub session_filter: Option<SessionFilterParam>,
}

impl From<HistoricalPricesParams> for HistoryQuery {
    fn from(params: HistoricalPricesParams) -> Self {
        Self {
            symbol: params.symbol,
            interval: params.interval.unwrap_or_default().into(),
            start: non_blank(params.start),
            end: non_blank(params.end),
            session_filter: params.session_filter.unwrap_or_default().into(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[tool_router(router = tool_router_history, vis = "pub")]
impl<M: MarketData> OptionsMcp<M> {
    #[tool(
        name = "historical-prices",
        description = "Fetch historical price bars for a symbol exactly as the brokerage reports them."
    )]
    async fn historical_prices(
        &self,
        Parameters(params): Parameters<HistoricalPricesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = HistoryQuery::from(params);
        info!(
            symbol = %query.symbol,
            interval = query.interval.as_str(),
            start = ?query.start,
            end = ?query.end,
            "historical-prices requested"
        );
        let history = self
            .control()
            .historical_prices(query)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(history)?]))
    }
}
