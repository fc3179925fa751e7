//! # Market Data Gateway
//!
//! Client-side access layer for public cryptocurrency market-data APIs
//! (CoinGecko, plus the Alternative.me Fear & Greed Index).
//!
//! A polling client hammering a rate-limited public API gets throttled fast.
//! The gateway sits between the application and the network and provides:
//!
//! - a response cache keyed by operation and normalized parameters, valid for
//!   120 seconds by default (tunable per operation);
//! - one global gate spacing all outbound requests at least one second apart,
//!   safe under concurrent callers;
//! - failure classification (rate limited, timeout, network unavailable,
//!   upstream error) reported to an injected [`NotificationSink`] and returned
//!   to the caller.
//!
//! ## Usage
//!
//! ```no_run
//! use market_data_gateway::{BroadcastSink, MarketDataGateway};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = Arc::new(BroadcastSink::new());
//! let mut notifications = sink.subscribe();
//! let gateway = Arc::new(MarketDataGateway::new(sink)?);
//!
//! // First two pages of 25 coins
//! let page_1 = gateway.get_market_data(25, 1).await?;
//! let page_2 = gateway.get_market_data(25, 26).await?;
//!
//! // Served from cache, no network call
//! let page_1_again = gateway.get_market_data(25, 1).await?;
//!
//! // Pull-to-refresh
//! gateway.clear_cache().await;
//!
//! while let Ok(notification) = notifications.try_recv() {
//!     println!("{}", notification);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! UI collaborator
//!     ↓
//! MarketDataGateway ──→ ResponseCache (hit: return)
//!     ↓ miss
//! RateLimiter (wait, stamp)
//!     ↓
//! MarketDataProvider (HttpProvider)
//!     ↓ failure
//! NotificationSink + Err(GatewayError)
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod notify;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use cache::CacheKey;
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::MarketDataGateway;
pub use metrics::GatewayMetrics;
pub use notify::{BroadcastSink, LogSink, Notification, NotificationSink, NullSink, Severity};
pub use provider::MarketDataProvider;
pub use types::{ComponentHealth, HealthStatus, Operation, Payload};
