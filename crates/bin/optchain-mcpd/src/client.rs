use std::sync::Arc;

use optchain_core::market::{MarketResult, TradierClient};
use tracing::info;

use crate::config::OptchainConfig;

pub fn build_market_client(config: &OptchainConfig) -> MarketResult<Arc<TradierClient>> {
    let client = TradierClient::new(config.tradier())?;
    info!(
        base_url = %client.base_url(),
        timeout = ?config.request_timeout,
        "market data client ready"
    );
    Ok(Arc::new(client))
}
