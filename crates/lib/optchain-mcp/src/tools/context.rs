use optchain_core::market::MarketData;
use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::OptionsMcp;

/// Payload listing the MCP commands this server exposes.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List MCP commands to get context with how this MCP server works."
                    .to_string(),
                "filtering_help - Describes how find-options-chain reduces a chain."
                    .to_string(),
                "find-options-chain - Fetch a filtered options chain for one expiration."
                    .to_string(),
                "historical-prices - Fetch historical price bars for a symbol."
                    .to_string(),
                "health - Liveness check."
                    .to_string(),
            ],
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl<M: MarketData> OptionsMcp<M> {
    #[tool(description = "List the MCP commands to get context with how this MCP server works.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }

    #[tool(description = "Describes how find-options-chain reduces a chain to liquid contracts at significant strikes.")]
    async fn filtering_help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text(
r"
1.  The underlying's last price (P) is fetched first, then the chain for the expiration.
2.  Quality filter, applied to every contract:
        - volume must be greater than 0.
        - bid and ask must both be greater than 0.10.
        - option_type must match the requested side unless `both` was requested.
3.  Strike window: strikes must lie within P * (1 - R/100) and P * (1 + R/100), inclusive,
    where R is `strike_percentage` clamped to 0-100.
4.  Significant strikes, by distance from P:
        - up to 2%: every strike.
        - over 2% up to 5%: multiples of 2.
        - over 5% up to 10%: multiples of 1 (P <= 100), otherwise 5.
        - over 10% up to 20%: multiples of 5 (P <= 100), otherwise 10.
        - over 20%: multiples of 10 (P <= 100), 25 (P <= 500), otherwise 50.
    A strike counts as a multiple when it is within 0.01 of one.
5.  Calls and puts at a kept strike are both returned when they pass the quality filter.
6.  If the underlying price is unavailable (zero), every liquid strike is returned.
"
        )]))
    }
}
