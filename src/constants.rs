//! Constants for the Market Data Gateway
//!
//! Compile-time defaults for the gateway. Every value here can be overridden
//! per instance through [`GatewayConfig`](crate::config::GatewayConfig).

/// How long a cached response stays valid (in milliseconds)
pub const CACHE_TTL_MS: u64 = 120_000;

/// Minimum spacing between two outbound requests (in milliseconds)
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1_000;

/// HTTP request timeout for every upstream call (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Page size used when the caller has no preference
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// History window used for charts when the caller has no preference
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Quote currency for all market queries
pub const VS_CURRENCY: &str = "usd";

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Alternative.me API base URL (Fear & Greed Index)
pub const FEAR_GREED_API_URL: &str = "https://api.alternative.me";

/// Environment variable overriding the CoinGecko base URL
pub const MARKET_DATA_API_URL_ENV: &str = "MARKET_DATA_API_URL";

/// Environment variable overriding the Fear & Greed base URL
pub const FEAR_GREED_API_URL_ENV: &str = "FEAR_GREED_API_URL";

/// Buffered notifications per [`BroadcastSink`](crate::notify::BroadcastSink) subscriber
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-data-gateway/0.1.0";
