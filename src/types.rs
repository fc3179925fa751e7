//! Types shared across the gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw decoded JSON body returned by an upstream endpoint
pub type Payload = serde_json::Value;

/// Read operations exposed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Paged market overview (`/coins/markets`)
    MarketData,
    /// Full id/symbol catalog (`/coins/list`)
    CoinsList,
    /// Spot price and 24h change (`/simple/price`)
    PriceData,
    /// Full coin payload (`/coins/{id}`)
    CoinData,
    /// Metadata-only coin payload (`/coins/{id}` with market fields stripped)
    CoinDetails,
    /// Daily chart series (`/coins/{id}/market_chart`)
    HistoricalData,
    /// Market rows for an explicit set of ids
    WatchlistData,
    /// Market sentiment index, served by a different host
    FearGreedIndex,
}

impl Operation {
    /// Stable name used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Operation::MarketData => "market_data",
            Operation::CoinsList => "coins_list",
            Operation::PriceData => "price_data",
            Operation::CoinData => "coin_data",
            Operation::CoinDetails => "coin_details",
            Operation::HistoricalData => "historical_data",
            Operation::WatchlistData => "watchlist_data",
            Operation::FearGreedIndex => "fear_greed_index",
        }
    }

    /// Get all operations
    pub fn all() -> &'static [Operation] {
        &[
            Operation::MarketData,
            Operation::CoinsList,
            Operation::PriceData,
            Operation::CoinData,
            Operation::CoinDetails,
            Operation::HistoricalData,
            Operation::WatchlistData,
            Operation::FearGreedIndex,
        ]
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Upstream host serving a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    /// CoinGecko market-data API
    CoinGecko,
    /// Alternative.me sentiment API
    FearGreed,
}

/// Overall gateway health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Upstream calls are succeeding
    Healthy,
    /// Some upstream calls are failing or being rate limited
    Degraded,
    /// Most upstream calls are failing
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
