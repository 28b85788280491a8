//! MCP server implementation for optchain-mcp.
//!
//! This crate wires the options control plane into rmcp tool handlers and
//! exposes the read-only market-data tools to MCP clients.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use optchain_core::control::OptionsControlPlane;
use optchain_core::market::MarketData;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

pub use tools::chain::{FindOptionsChainParams, OptionTypeParam};
pub use tools::history::{HistoricalPricesParams, IntervalParam, SessionFilterParam};

const SERVER_INSTRUCTIONS: &str = r"optchain-mcp provides read-only brokerage market data for options analysis.

Tools:
1. `find-options-chain` returns a reduced options chain for one expiration as `{ option: [...] }`.
   - `symbol` is required. `expiration` is `YYYY-MM-DD`; when omitted the nearest listed expiration is used.
   - `option_type` is `call`, `put`, or `both` (default `both`). `greeks` defaults to true.
   - `strike_percentage` (default 10, clamped to 0-100) bounds strikes around the underlying's last price.
   - Contracts with zero volume or a bid/ask at or below 0.10 are dropped.
   - Within 2% of the underlying every strike is kept; further out only round strikes are kept,
     with coarser rounding at larger distances and for higher-priced underlyings.
2. `historical-prices` returns price bars exactly as the brokerage reports them.
   - `interval` is `daily`, `weekly`, or `monthly`. `start`/`end` are `YYYY-MM-DD`.
   - `session_filter` is `all` or `open`.

Notes:
- Upstream failures are returned as errors with the HTTP status and request parameters; nothing is retried.
- Use `help` for a summary of tools and `health` for a liveness check.";

/// MCP server wrapper around the options control plane and tool routers.
pub struct OptionsMcp<M: MarketData> {
    tool_router: ToolRouter<Self>,
    control: OptionsControlPlane<M>,
}

impl<M: MarketData> Clone for OptionsMcp<M> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            control: self.control.clone(),
        }
    }
}

impl<M: MarketData> OptionsMcp<M> {
    /// Creates a new server owning `market`.
    #[must_use]
    pub fn new(market: M) -> Self {
        Self::with_control(OptionsControlPlane::new(market))
    }

    /// Creates a new server over a shared market-data handle.
    #[must_use]
    pub fn with_market(market: Arc<M>) -> Self {
        Self::with_control(OptionsControlPlane::from_arc(market))
    }

    /// Creates a new server over an existing control plane.
    #[must_use]
    pub fn with_control(control: OptionsControlPlane<M>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_chain()
            + Self::tool_router_history()
            + Self::tool_router_context();
        Self {
            tool_router,
            control,
        }
    }

    pub(crate) const fn control(&self) -> &OptionsControlPlane<M> {
        &self.control
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<M: MarketData> OptionsMcp<M> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl<M: MarketData> ServerHandler for OptionsMcp<M> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use optchain_core::market::{HistoryRequest, MarketResult};
    use optchain_model::schema::{TOOL_FIND_OPTIONS_CHAIN, TOOL_HISTORICAL_PRICES};
    use serde_json::{Value, json};

    use super::*;

    struct EmptyMarket;

    impl MarketData for EmptyMarket {
        async fn quote(&self, _symbol: &str) -> MarketResult<Value> {
            Ok(json!({}))
        }

        async fn option_chain(
            &self,
            _symbol: &str,
            _expiration: NaiveDate,
            _greeks: bool,
        ) -> MarketResult<Value> {
            Ok(json!({ "options": null }))
        }

        async fn option_expirations(&self, _symbol: &str) -> MarketResult<Value> {
            Ok(json!({ "expirations": null }))
        }

        async fn history(&self, _request: &HistoryRequest) -> MarketResult<Value> {
            Ok(json!({ "history": null }))
        }
    }

    #[test]
    fn router_exposes_market_tools() {
        let server = OptionsMcp::new(EmptyMarket);
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        for expected in [TOOL_FIND_OPTIONS_CHAIN, TOOL_HISTORICAL_PRICES, "health", "help"] {
            assert!(names.iter().any(|name| name == expected), "missing tool {expected}");
        }
    }

    #[test]
    fn server_info_carries_instructions() {
        let info = OptionsMcp::new(EmptyMarket).get_info();
        let instructions = info.instructions.expect("instructions should be set");
        assert!(instructions.contains(TOOL_FIND_OPTIONS_CHAIN));
        assert!(instructions.contains(TOOL_HISTORICAL_PRICES));
    }
}
