//! Runtime configuration of a gateway instance

use crate::{
    constants::{
        CACHE_TTL_MS, COINGECKO_API_URL, FEAR_GREED_API_URL, FEAR_GREED_API_URL_ENV,
        MARKET_DATA_API_URL_ENV, MIN_REQUEST_INTERVAL_MS, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    types::{Operation, Upstream},
};
use std::collections::HashMap;
use std::time::Duration;

/// Settings for a [`MarketDataGateway`](crate::gateway::MarketDataGateway)
///
/// `Default` reproduces the compile-time constants. Tests usually only swap
/// the base URLs and shorten the intervals.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// CoinGecko API base URL, without trailing slash
    pub coingecko_api_url: String,
    /// Fear & Greed API base URL, without trailing slash
    pub fear_greed_api_url: String,
    /// TTL used for operations without an override
    pub cache_ttl: Duration,
    /// Per-operation TTL overrides
    pub ttl_overrides: HashMap<Operation, Duration>,
    /// Minimum spacing between two outbound requests
    pub min_request_interval: Duration,
    /// Deadline applied to every HTTP request
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            coingecko_api_url: COINGECKO_API_URL.to_string(),
            fear_greed_api_url: FEAR_GREED_API_URL.to_string(),
            cache_ttl: Duration::from_millis(CACHE_TTL_MS),
            ttl_overrides: HashMap::new(),
            min_request_interval: Duration::from_millis(MIN_REQUEST_INTERVAL_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Defaults, with base URLs taken from `MARKET_DATA_API_URL` and
    /// `FEAR_GREED_API_URL` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(MARKET_DATA_API_URL_ENV) {
            tracing::info!(url = %url, "Using market data API URL from environment");
            config = config.with_coingecko_api_url(url);
        }
        if let Ok(url) = std::env::var(FEAR_GREED_API_URL_ENV) {
            tracing::info!(url = %url, "Using Fear & Greed API URL from environment");
            config = config.with_fear_greed_api_url(url);
        }

        config
    }

    pub fn with_coingecko_api_url(mut self, url: impl Into<String>) -> Self {
        self.coingecko_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_fear_greed_api_url(mut self, url: impl Into<String>) -> Self {
        self.fear_greed_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Overrides the TTL of a single operation
    pub fn with_ttl(mut self, operation: Operation, ttl: Duration) -> Self {
        self.ttl_overrides.insert(operation, ttl);
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// TTL applied to responses of `operation`
    pub fn ttl_for(&self, operation: Operation) -> Duration {
        self.ttl_overrides
            .get(&operation)
            .copied()
            .unwrap_or(self.cache_ttl)
    }

    /// Base URL of the given upstream host
    pub fn base_url(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::CoinGecko => &self.coingecko_api_url,
            Upstream::FearGreed => &self.fear_greed_api_url,
        }
    }
}
