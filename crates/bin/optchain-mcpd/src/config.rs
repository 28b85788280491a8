use clap::{Parser, builder::BoolishValueParser};
use optchain_core::market::TradierConfig;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "optchain-mcpd", version, about = "Options chain MCP daemon.")]
#[allow(clippy::struct_excessive_bools)]
struct CliArgs {
    #[arg(long, env = "TRADIER_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    #[arg(long, env = "TRADIER_BASE_URL")]
    base_url: Option<String>,

    #[arg(
        long,
        env = "TRADIER_SANDBOX",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    sandbox: bool,

    #[arg(
        long,
        env = "OPTCHAIN_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(
        long = "stdio",
        env = "OPTCHAIN_ENABLE_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "OPTCHAIN_MCP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "OPTCHAIN_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "OPTCHAIN_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct OptchainConfig {
    pub api_token: String,
    pub base_url: Option<String>,
    pub sandbox: bool,
    pub request_timeout: Option<Duration>,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub log_filter: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl fmt::Debug for OptchainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptchainConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("sandbox", &self.sandbox)
            .field("request_timeout", &self.request_timeout)
            .field("enable_stdio", &self.enable_stdio)
            .field("mcp_serve", &self.mcp_serve)
            .field("mcp_http_addr", &self.mcp_http_addr)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl OptchainConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    /// Client settings for the brokerage API. An explicit base URL wins over `sandbox`.
    pub fn tradier(&self) -> TradierConfig {
        let config = TradierConfig::new(self.api_token.clone()).with_timeout(self.request_timeout);
        match (&self.base_url, self.sandbox) {
            (Some(base_url), _) => config.with_base_url(base_url.clone()),
            (None, true) => config.with_sandbox(),
            (None, false) => config,
        }
    }
}

impl TryFrom<CliArgs> for OptchainConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let api_token = args
            .api_token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingSetting("TRADIER_API_TOKEN"))?;

        let base_url = args
            .base_url
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if let Some(value) = &base_url
            && Url::parse(value).is_err()
        {
            return Err(ConfigError::InvalidSetting {
                name: "TRADIER_BASE_URL",
                value: value.clone(),
            });
        }

        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::InvalidSetting {
                name: "OPTCHAIN_ENABLE_STDIO",
                value: "false (no transport enabled; set OPTCHAIN_MCP_SERVE=true)".to_string(),
            });
        }

        let request_timeout = if args.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.request_timeout_secs))
        };

        let log_filter = if args.log_filter.trim().is_empty() {
            DEFAULT_LOG_FILTER.to_string()
        } else {
            args.log_filter
        };

        Ok(Self {
            api_token,
            base_url,
            sandbox: args.sandbox,
            request_timeout,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            log_filter,
        })
    }
}
