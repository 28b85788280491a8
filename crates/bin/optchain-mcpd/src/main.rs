//! Daemon entry point for the options chain MCP server.
//!
//! Loads configuration from the CLI and environment, builds the brokerage
//! client, and serves the MCP protocol over stdio and/or streamable HTTP.

mod client;
mod config;

use optchain_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::build_market_client;
use crate::config::OptchainConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = OptchainConfig::from_args()?;
    init_tracing(&config.log_filter);

    let market = build_market_client(&config)?;

    let http = config.mcp_serve.then(|| {
        let http_config = McpHttpServerConfig::new(config.mcp_http_addr);
        let market = market.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_streamable_http(market, http_config).await {
                error!(%err, "MCP HTTP server stopped");
            }
        })
    });

    if config.enable_stdio {
        serve_stdio(market).await?;
        info!("stdio transport closed; shutting down");
    } else if let Some(http) = http {
        http.await?;
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(log_filter: &str) {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
