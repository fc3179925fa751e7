//! Market Data Gateway
//!
//! Typed read operations over the market-data APIs with response caching,
//! a global request spacing gate, and classified failure reporting.

use crate::{
    cache::ResponseCache,
    config::GatewayConfig,
    constants::{DEFAULT_HISTORY_DAYS, DEFAULT_PAGE_SIZE},
    error::GatewayError,
    metrics::{GatewayMetrics, MetricsCollector},
    notify::{Notification, NotificationSink, Severity},
    provider::MarketDataProvider,
    providers::HttpProvider,
    rate_limit::RateLimiter,
    request::{normalize_ids, ApiRequest},
    types::{ComponentHealth, HealthStatus, Payload},
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::instrument;

/// Client-side access layer for the market-data APIs
///
/// Construct one per application and share it behind an `Arc`. Every read
/// operation follows the same path:
///
/// 1. a valid cache entry is returned as is, without touching the network;
/// 2. otherwise the shared rate limiter is acquired and the request is issued;
/// 3. a successful body is cached and returned;
/// 4. a failure is logged, sent to the notification sink and returned.
///
/// # Example
/// ```no_run
/// use market_data_gateway::{LogSink, MarketDataGateway};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = MarketDataGateway::new(Arc::new(LogSink))?;
/// let first_page = gateway.get_market_data(25, 1).await?;
/// let chart = gateway.get_coin_historical_data("bitcoin", 30).await?;
/// # Ok(())
/// # }
/// ```
pub struct MarketDataGateway {
    config: GatewayConfig,
    provider: Arc<dyn MarketDataProvider>,
    cache: ResponseCache,
    limiter: RateLimiter,
    sink: Arc<dyn NotificationSink>,
    metrics: MetricsCollector,
}

impl MarketDataGateway {
    /// Creates a gateway against the public APIs with default settings
    pub fn new(sink: Arc<dyn NotificationSink>) -> Result<Self, GatewayError> {
        Self::with_config(GatewayConfig::default(), sink)
    }

    /// Creates a gateway using an HTTP provider built from `config`
    pub fn with_config(
        config: GatewayConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, GatewayError> {
        let provider = Arc::new(HttpProvider::new(&config)?);
        Ok(Self::with_provider(provider, config, sink))
    }

    /// Creates a gateway with a custom provider
    ///
    /// This is primarily for testing with mock providers.
    pub fn with_provider(
        provider: Arc<dyn MarketDataProvider>,
        config: GatewayConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        tracing::info!(
            provider = provider.provider_name(),
            cache_ttl_ms = config.cache_ttl.as_millis() as u64,
            min_request_interval_ms = config.min_request_interval.as_millis() as u64,
            "Market data gateway initialized"
        );

        Self {
            limiter: RateLimiter::new(config.min_request_interval),
            cache: ResponseCache::new(),
            metrics: MetricsCollector::new(),
            config,
            provider,
            sink,
        }
    }

    /// One page of coins ranked by market cap
    ///
    /// `start_index` is the 1-based rank of the first coin the caller wants;
    /// the page containing it is fetched. Both arguments are clamped to at least 1.
    #[instrument(skip(self))]
    pub async fn get_market_data(
        &self,
        page_size: u32,
        start_index: u32,
    ) -> Result<Payload, GatewayError> {
        self.execute(ApiRequest::market_data(page_size, start_index))
            .await
    }

    /// First page with the default page size
    pub async fn get_default_market_data(&self) -> Result<Payload, GatewayError> {
        self.get_market_data(DEFAULT_PAGE_SIZE, 1).await
    }

    /// Full id/symbol catalog. Never cached.
    #[instrument(skip(self))]
    pub async fn get_coins_list(&self) -> Result<Payload, GatewayError> {
        self.execute(ApiRequest::coins_list()).await
    }

    /// Spot USD price and 24h change for `ids`. Never cached.
    ///
    /// An empty id list yields an empty object without a network call.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_price_data<S: AsRef<str>>(&self, ids: &[S]) -> Result<Payload, GatewayError> {
        let ids = normalize_ids(ids);
        if ids.is_empty() {
            return Ok(json!({}));
        }
        self.execute(ApiRequest::price_data(&ids)).await
    }

    /// Full coin payload, including market and ticker data
    #[instrument(skip(self))]
    pub async fn get_coin_data(&self, coin_id: &str) -> Result<Payload, GatewayError> {
        self.execute(ApiRequest::coin_data(coin_id.trim())).await
    }

    /// Coin metadata (description, links, images) without market data
    #[instrument(skip(self))]
    pub async fn get_coin_details(&self, coin_id: &str) -> Result<Payload, GatewayError> {
        self.execute(ApiRequest::coin_details(coin_id.trim())).await
    }

    /// Daily price, market cap and volume series for charting
    #[instrument(skip(self))]
    pub async fn get_coin_historical_data(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Payload, GatewayError> {
        self.execute(ApiRequest::historical_data(coin_id.trim(), days))
            .await
    }

    /// Chart series over the default window
    pub async fn get_default_historical_data(
        &self,
        coin_id: &str,
    ) -> Result<Payload, GatewayError> {
        self.get_coin_historical_data(coin_id, DEFAULT_HISTORY_DAYS)
            .await
    }

    /// Market rows for exactly the given ids
    ///
    /// The id set is order independent. An empty set yields an empty array
    /// without a network call.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_watchlist_data<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Payload, GatewayError> {
        let ids = normalize_ids(ids);
        if ids.is_empty() {
            return Ok(json!([]));
        }
        self.execute(ApiRequest::watchlist_data(&ids)).await
    }

    /// Current Fear & Greed Index
    #[instrument(skip(self))]
    pub async fn get_fear_greed_index(&self) -> Result<Payload, GatewayError> {
        self.execute(ApiRequest::fear_greed_index()).await
    }

    /// Drops every cached response, e.g. on pull-to-refresh
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Number of cached responses
    pub async fn cached_entries(&self) -> usize {
        self.cache.purge_expired().await;
        self.cache.len().await
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the name of the current provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Gets request, failure and cache metrics
    pub async fn metrics(&self) -> GatewayMetrics {
        self.metrics.snapshot().await
    }

    /// Perform a health check on the gateway
    ///
    /// Health is derived from the upstream success rate. A gateway that has not
    /// issued any request yet is reported healthy.
    pub async fn health_check(&self) -> ComponentHealth {
        let metrics = self.metrics().await;
        let cached_entries = self.cached_entries().await;

        let mut details = HashMap::new();
        details.insert("provider_name".to_string(), json!(self.provider_name()));
        details.insert("cached_entries".to_string(), json!(cached_entries));
        details.insert("total_requests".to_string(), json!(metrics.total_requests));
        details.insert("failed_requests".to_string(), json!(metrics.failed_requests));
        details.insert(
            "rate_limited_requests".to_string(),
            json!(metrics.rate_limited_requests),
        );
        details.insert("success_rate".to_string(), json!(metrics.success_rate));

        let status = if metrics.success_rate < 0.5 {
            HealthStatus::Unhealthy
        } else if metrics.success_rate < 0.9 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let message = match status {
            HealthStatus::Healthy => "Market data gateway is operational".to_string(),
            HealthStatus::Degraded => format!(
                "Market data gateway has {} failed requests",
                metrics.failed_requests
            ),
            HealthStatus::Unhealthy => {
                "Market data gateway requests are mostly failing".to_string()
            }
        };

        ComponentHealth {
            name: "market_data_gateway".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: chrono::Utc::now(),
        }
    }

    /// Cache lookup, then rate-limited fetch, then cache store or failure report
    async fn execute(&self, request: ApiRequest) -> Result<Payload, GatewayError> {
        if let Some(key) = &request.cache_key {
            if let Some(payload) = self.cache.get(key).await {
                tracing::debug!(key = %key, "Serving cached response");
                self.metrics.record_cache_hit().await;
                return Ok(payload);
            }
            self.metrics.record_cache_miss().await;
        }

        let waited = self.limiter.acquire().await;
        let start = Instant::now();
        let result = self.provider.fetch(&request).await;
        let latency = start.elapsed();

        match result {
            Ok(payload) => {
                tracing::debug!(
                    operation = %request.operation,
                    waited_ms = waited.as_millis() as u64,
                    latency_ms = latency.as_millis() as u64,
                    "Upstream request succeeded"
                );
                self.metrics.record_request(latency, None).await;

                if let Some(key) = request.cache_key {
                    let ttl = self.config.ttl_for(request.operation);
                    self.cache.insert(key, payload.clone(), ttl).await;
                }
                Ok(payload)
            }
            Err(error) => {
                self.metrics.record_request(latency, Some(&error)).await;
                self.report_failure(&request, &error);
                Err(error)
            }
        }
    }

    fn report_failure(&self, request: &ApiRequest, error: &GatewayError) {
        let notification = Notification::for_failure(error, &request.subject);

        match notification.severity {
            Severity::Warning => tracing::warn!(
                operation = %request.operation,
                kind = error.kind(),
                error = %error,
                "Upstream request failed"
            ),
            Severity::Error => tracing::error!(
                operation = %request.operation,
                kind = error.kind(),
                error = %error,
                "Upstream request failed"
            ),
        }

        self.sink.notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use crate::notify::mock::RecordingSink;
    use crate::provider::mock::MockProvider;
    use crate::types::Operation;
    use futures::future::join_all;
    use std::time::Duration;

    const MIN_INTERVAL: Duration = Duration::from_millis(1000);
    const TTL: Duration = Duration::from_millis(120_000);

    struct Harness {
        gateway: MarketDataGateway,
        provider: Arc<MockProvider>,
        sink: Arc<RecordingSink>,
    }

    fn harness_with(config: GatewayConfig) -> Harness {
        let provider = Arc::new(MockProvider::new());
        let sink = Arc::new(RecordingSink::new());
        let gateway = MarketDataGateway::with_provider(provider.clone(), config, sink.clone());
        Harness {
            gateway,
            provider,
            sink,
        }
    }

    fn harness() -> Harness {
        harness_with(GatewayConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_details_fetch_hits_network_once() {
        let h = harness();
        h.provider
            .set_payload(Operation::CoinDetails, json!({"id": "bitcoin", "name": "Bitcoin"}));

        let first = h.gateway.get_coin_details("bitcoin").await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        let second = h.gateway.get_coin_details("bitcoin").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_refetched_after_ttl() {
        let h = harness();

        h.gateway.get_coin_details("bitcoin").await.unwrap();
        tokio::time::advance(TTL).await;
        h.gateway.get_coin_details("bitcoin").await.unwrap();

        assert_eq!(h.provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paging_market_data() {
        let h = harness();

        h.gateway.get_market_data(25, 1).await.unwrap();
        h.gateway.get_market_data(25, 26).await.unwrap();

        let calls = h.provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].request.cache_key,
            Some(CacheKey::market_data(25, 1))
        );
        assert_eq!(
            calls[1].request.cache_key,
            Some(CacheKey::market_data(25, 2))
        );
        assert_eq!(calls[1].request.query_param("page"), Some("2"));
        assert!(calls[1].dispatched_at - calls[0].dispatched_at >= MIN_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_bypasses_rate_limiter() {
        let h = harness();

        h.gateway.get_fear_greed_index().await.unwrap();
        let stamp = h.gateway.limiter.last_request_at().await;

        let before = Instant::now();
        h.gateway.get_fear_greed_index().await.unwrap();

        assert_eq!(Instant::now(), before);
        assert_eq!(h.gateway.limiter.last_request_at().await, stamp);
        assert_eq!(h.provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cache_forces_refetch() {
        let h = harness();

        h.gateway.get_coin_historical_data("bitcoin", 30).await.unwrap();
        h.gateway.clear_cache().await;
        h.gateway.get_coin_historical_data("bitcoin", 30).await.unwrap();

        assert_eq!(h.provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_historical_fetch() {
        let h = harness();
        h.provider
            .set_error(Operation::HistoricalData, GatewayError::RateLimited);

        let result = h.gateway.get_coin_historical_data("bitcoin", 30).await;

        assert_eq!(result, Err(GatewayError::RateLimited));
        let received = h.sink.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].severity, Severity::Warning);
        assert!(h
            .gateway
            .cache
            .get(&CacheKey::historical("bitcoin", 30))
            .await
            .is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_is_reported_as_error() {
        let h = harness();
        h.provider.set_error(
            Operation::MarketData,
            GatewayError::NetworkUnavailable("connection refused".to_string()),
        );

        let result = h.gateway.get_market_data(50, 1).await;

        assert!(matches!(result, Err(GatewayError::NetworkUnavailable(_))));
        let received = h.sink.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].severity, Severity::Error);
        assert_eq!(
            received[0].message,
            "Network error. Check your internet connection."
        );
        assert_eq!(h.gateway.cached_entries().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_failure_names_subject() {
        let h = harness();
        h.provider
            .set_error(Operation::CoinDetails, GatewayError::status(404, "not found"));

        let result = h.gateway.get_coin_details("nocoin").await;

        assert!(result.is_err());
        assert_eq!(h.sink.received()[0].message, "Failed to load details for nocoin.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_poison_cache() {
        let h = harness();
        h.provider.set_error(Operation::FearGreedIndex, GatewayError::Timeout);
        assert!(h.gateway.get_fear_greed_index().await.is_err());

        h.provider
            .set_payload(Operation::FearGreedIndex, json!({"data": [{"value": "42"}]}));
        let payload = h.gateway.get_fear_greed_index().await.unwrap();

        assert_eq!(payload, json!({"data": [{"value": "42"}]}));
        assert_eq!(h.provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_ids_are_order_independent() {
        let h = harness();

        h.gateway.get_watchlist_data(&["ethereum", "bitcoin"]).await.unwrap();
        h.gateway.get_watchlist_data(&["bitcoin", "ethereum"]).await.unwrap();

        let calls = h.provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request.query_param("ids"), Some("bitcoin,ethereum"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_id_lists_skip_network() {
        let h = harness();
        let none: [&str; 0] = [];

        assert_eq!(h.gateway.get_watchlist_data(&none).await.unwrap(), json!([]));
        assert_eq!(h.gateway.get_price_data(&none).await.unwrap(), json!({}));
        assert_eq!(h.provider.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncached_operations_are_still_spaced() {
        let h = harness();

        h.gateway.get_coins_list().await.unwrap();
        h.gateway.get_coins_list().await.unwrap();
        h.gateway.get_price_data(&["bitcoin"]).await.unwrap();

        let calls = h.provider.calls();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1].dispatched_at - pair[0].dispatched_at >= MIN_INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_are_spaced() {
        let h = harness();
        let ids = ["bitcoin", "ethereum", "solana", "cardano"];

        let results = join_all(ids.iter().map(|id| h.gateway.get_coin_details(id))).await;
        assert!(results.iter().all(|r| r.is_ok()));

        let mut dispatched: Vec<_> = h
            .provider
            .calls()
            .into_iter()
            .map(|call| call.dispatched_at)
            .collect();
        dispatched.sort();

        assert_eq!(dispatched.len(), 4);
        for pair in dispatched.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_operation_ttl() {
        let h = harness_with(
            GatewayConfig::default().with_ttl(Operation::CoinDetails, Duration::from_secs(3600)),
        );

        h.gateway.get_coin_details("bitcoin").await.unwrap();
        h.gateway.get_market_data(25, 1).await.unwrap();
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        h.gateway.get_coin_details("bitcoin").await.unwrap();
        h.gateway.get_market_data(25, 1).await.unwrap();

        let operations: Vec<_> = h
            .provider
            .calls()
            .into_iter()
            .map(|call| call.request.operation)
            .collect();
        assert_eq!(
            operations,
            vec![Operation::CoinDetails, Operation::MarketData, Operation::MarketData]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_coin_data_and_details_do_not_share_entries() {
        let h = harness();

        h.gateway.get_coin_data("bitcoin").await.unwrap();
        h.gateway.get_coin_details("bitcoin").await.unwrap();

        assert_eq!(h.provider.call_count(), 2);
        assert_eq!(h.gateway.cached_entries().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_and_health() {
        let h = harness();

        h.gateway.get_coin_details("bitcoin").await.unwrap();
        h.gateway.get_coin_details("bitcoin").await.unwrap();
        let metrics = h.gateway.metrics().await;
        assert_eq!(metrics.total_requests, 1);
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.cache_misses, 1);
        assert_eq!(h.gateway.health_check().await.status, HealthStatus::Healthy);

        h.provider.set_error(Operation::MarketData, GatewayError::RateLimited);
        for start in [1, 51, 101] {
            assert!(h.gateway.get_market_data(50, start).await.is_err());
        }

        let health = h.gateway.health_check().await;
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.details["rate_limited_requests"], json!(3));
        assert_eq!(h.gateway.metrics().await.rate_limited_requests, 3);
    }
}
