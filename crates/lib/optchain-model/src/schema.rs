pub const TRADIER_API_URL: &str = "https://api.tradier.com";
pub const TRADIER_SANDBOX_URL: &str = "https://sandbox.tradier.com";

pub const PATH_QUOTES: &str = "/v1/markets/quotes";
pub const PATH_OPTION_CHAINS: &str = "/v1/markets/options/chains";
pub const PATH_OPTION_EXPIRATIONS: &str = "/v1/markets/options/expirations";
pub const PATH_HISTORY: &str = "/v1/markets/history";

pub const TOOL_FIND_OPTIONS_CHAIN: &str = "find-options-chain";
pub const TOOL_HISTORICAL_PRICES: &str = "historical-prices";

/// Radius used by the pipeline when a request carries no percentage.
pub const DEFAULT_STRIKE_PERCENTAGE: f64 = 20.0;
/// Radius advertised as the tool-level default.
pub const TOOL_STRIKE_PERCENTAGE: f64 = 10.0;
pub const MIN_STRIKE_PERCENTAGE: f64 = 0.0;
pub const MAX_STRIKE_PERCENTAGE: f64 = 100.0;

/// Bid and ask must be strictly above this to count as quoted.
pub const MIN_QUOTED_PRICE: f64 = 0.10;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
