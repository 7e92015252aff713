/*
 * Responsibility
 * - Load settings from flags, falling back to environment variables (.env is loaded first)
 * - Validate them (missing or invalid values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use url::Url;

const MAX_LEEWAY_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Parser)]
#[command(name = "jwks-auth-demo", version, about)]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// JWKS URL
    #[arg(long, env = "JWKS_URL")]
    pub jwks_url: Option<String>,

    /// Expected issuer
    #[arg(long, env = "EXPECTED_ISSUER")]
    pub expected_issuer: Option<String>,

    /// Expected audience
    #[arg(long, env = "EXPECTED_AUDIENCE")]
    pub expected_audience: Option<String>,

    /// Allowed clock skew for exp/nbf/iat, seconds
    #[arg(long, env = "ACCESS_TOKEN_LEEWAY_SECONDS", default_value_t = 5)]
    pub leeway_seconds: u64,

    /// Key set freshness when the source sends no max-age, seconds
    #[arg(long, env = "JWKS_REFRESH_INTERVAL_SECONDS", default_value_t = 900)]
    pub jwks_refresh_interval_seconds: u64,

    /// Minimum time between key set refresh attempts, seconds
    #[arg(long, env = "JWKS_MIN_REFRESH_INTERVAL_SECONDS", default_value_t = 60)]
    pub jwks_min_refresh_interval_seconds: u64,

    /// Timeout for one key set download, seconds
    #[arg(long, env = "JWKS_FETCH_TIMEOUT_SECONDS", default_value_t = 10)]
    pub jwks_fetch_timeout_seconds: u64,

    /// Timeout for handling one request, seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 30)]
    pub request_timeout_seconds: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub jwks_url: Url,
    pub expected_issuer: String,
    pub expected_audience: String,
    pub access_token_leeway_seconds: u64,

    pub jwks_refresh_interval: Duration,
    pub jwks_min_refresh_interval: Duration,
    pub jwks_fetch_timeout: Duration,

    pub request_timeout: Duration,
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

        let jwks_url = required(args.jwks_url, "JWKS_URL")?;
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("JWKS_URL"))?;
        if !matches!(jwks_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("JWKS_URL"));
        }

        let expected_issuer = required(args.expected_issuer, "EXPECTED_ISSUER")?;
        let expected_audience = required(args.expected_audience, "EXPECTED_AUDIENCE")?;

        if args.leeway_seconds > MAX_LEEWAY_SECONDS {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"));
        }

        if args.jwks_fetch_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("JWKS_FETCH_TIMEOUT_SECONDS"));
        }
        // A first key set fetch must fail (401) before the request itself times out (408).
        if args.request_timeout_seconds <= args.jwks_fetch_timeout_seconds {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr,
            jwks_url,
            expected_issuer,
            expected_audience,
            access_token_leeway_seconds: args.leeway_seconds,
            jwks_refresh_interval: Duration::from_secs(args.jwks_refresh_interval_seconds),
            jwks_min_refresh_interval: Duration::from_secs(args.jwks_min_refresh_interval_seconds),
            jwks_fetch_timeout: Duration::from_secs(args.jwks_fetch_timeout_seconds),
            request_timeout: Duration::from_secs(args.request_timeout_seconds),
        })
    }
}
