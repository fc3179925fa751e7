//! Gateway metrics collection and reporting
//!
//! Tracks upstream latency, failure counts and cache effectiveness.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for latency percentiles
const MAX_SAMPLES: usize = 100;

/// Snapshot of gateway metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMetrics {
    /// 50th percentile latency of successful upstream calls, in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency of successful upstream calls, in milliseconds
    pub latency_p99_ms: f64,
    /// Share of upstream calls that succeeded (0.0 to 1.0)
    pub success_rate: f64,
    /// Upstream calls issued
    pub total_requests: u64,
    /// Upstream calls that failed for any reason
    pub failed_requests: u64,
    /// Upstream calls answered with HTTP 429
    pub rate_limited_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl GatewayMetrics {
    /// Share of cacheable lookups served from the cache (0.0 when none happened)
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    total_requests: u64,
    failed_requests: u64,
    rate_limited_requests: u64,
    cache_hits: u64,
    cache_misses: u64,
}

/// Collects and computes metrics for a gateway
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Rolling window of successful call latencies, in milliseconds
    samples: RwLock<VecDeque<f64>>,
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(VecDeque::with_capacity(MAX_SAMPLES)),
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Records an upstream call and its outcome
    pub async fn record_request(&self, duration: Duration, error: Option<&GatewayError>) {
        {
            let mut counters = self.counters.write().await;
            counters.total_requests += 1;
            if let Some(error) = error {
                counters.failed_requests += 1;
                if error.is_rate_limited() {
                    counters.rate_limited_requests += 1;
                }
            }
        }

        if error.is_none() {
            let mut samples = self.samples.write().await;
            if samples.len() >= MAX_SAMPLES {
                samples.pop_front();
            }
            samples.push_back(duration.as_secs_f64() * 1000.0);
        }
    }

    pub async fn record_cache_hit(&self) {
        self.counters.write().await.cache_hits += 1;
    }

    pub async fn record_cache_miss(&self) {
        self.counters.write().await.cache_misses += 1;
    }

    /// Computes current metrics from collected samples
    pub async fn snapshot(&self) -> GatewayMetrics {
        let mut latencies: Vec<f64> = self.samples.read().await.iter().copied().collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let counters = self.counters.read().await;
        let success_rate = if counters.total_requests > 0 {
            (counters.total_requests - counters.failed_requests) as f64
                / counters.total_requests as f64
        } else {
            1.0
        };

        GatewayMetrics {
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: counters.total_requests,
            failed_requests: counters.failed_requests,
            rate_limited_requests: counters.rate_limited_requests,
            cache_hits: counters.cache_hits,
            cache_misses: counters.cache_misses,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
