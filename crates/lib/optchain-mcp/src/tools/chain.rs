use optchain_core::control::ChainQuery;
use optchain_core::market::MarketData;
use optchain_core::pipeline::TracingDiagnostics;
use optchain_model::OptionTypeFilter;
use optchain_model::schema::TOOL_STRIKE_PERCENTAGE;
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

/// Contract side accepted by `find-options-chain`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OptionTypeParam {
    Call,
    Put,
    #[default]
    Both,
}

impl From<OptionTypeParam> for OptionTypeFilter {
    fn from(value: OptionTypeParam) -> Self {
        match value {
            OptionTypeParam::Call => Self::Call,
            OptionTypeParam::Put => Self::Put,
            OptionTypeParam::Both => Self::Both,
        }
    }
}

/// Parameters for fetching a filtered options chain.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FindOptionsChainParams {
    /// Underlying ticker, e.g. `SPY`.
    pub symbol: String,
    /// Expiration date as `YYYY-MM-DD`. Defaults to the nearest listed expiration.
    pub expiration: Option<String>,
    /// Include greeks on each contract. Defaults to true.
    pub greeks: Option<bool>,
    /// `call`, `put`, or `both`. Defaults to `both`.
    pub option_type: Option<OptionTypeParam>,
    /// Strike radius around the underlying's last price, in percent. Defaults to 10.
    pub strike_percentage: Option<f64>,
}

impl From<FindOptionsChainParams> for ChainQuery {
    fn from(params: FindOptionsChainParams) -> Self {
        let mut query = Self::new(params.symbol)
            .with_greeks(params.greeks.unwrap_or(true))
            .with_option_type(params.option_type.unwrap_or_default().into())
            .with_strike_percentage(params.strike_percentage.unwrap_or(TOOL_STRIKE_PERCENTAGE));
        query.expiration = params
            .expiration
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        query
    }
}

#[tool_router(router = tool_router_chain, vis = "pub")]
impl<M: MarketData> OptionsMcp<M> {
    #[tool(
        name = "find-options-chain",
        description = "Fetch an options chain for one expiration, keeping liquid contracts at significant strikes near the underlying price."
    )]
    async fn find_options_chain(
        &self,
        Parameters(params): Parameters<FindOptionsChainParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = ChainQuery::from(params);
        let diagnostics = TracingDiagnostics::new(query.symbol.trim().to_ascii_uppercase());
        info!(
            symbol = %query.symbol,
            expiration = ?query.expiration,
            option_type = ?query.option_type,
            "find-options-chain requested"
        );
        let chain = self
            .control()
            .find_options_chain(query, &diagnostics)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(chain)?]))
    }
}
