use market_data_gateway::{BroadcastSink, GatewayConfig, MarketDataGateway};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let sink = Arc::new(BroadcastSink::new());
    let mut notifications = sink.subscribe();
    let gateway = MarketDataGateway::with_config(GatewayConfig::from_env(), sink)?;

    println!("Market snapshot (provider: {})", gateway.provider_name());
    println!("-------------------------------------------");

    // 1. Two pages, the second one held back by the rate limiter
    for start_index in [1, 11] {
        let start = Instant::now();
        match gateway.get_market_data(10, start_index).await {
            Ok(page) => {
                let coins = page.as_array().map(Vec::len).unwrap_or_default();
                println!(
                    "Page starting at #{:<3} {} coins in {:?}",
                    start_index,
                    coins,
                    start.elapsed()
                );
            }
            Err(e) => println!("Page starting at #{start_index} failed: {e}"),
        }
    }

    // 2. Same page again, served from the cache
    let start = Instant::now();
    if gateway.get_market_data(10, 1).await.is_ok() {
        println!("Cached page in {:?}", start.elapsed());
    }

    // 3. Sentiment from the second host
    if let Ok(index) = gateway.get_fear_greed_index().await {
        let value = &index["data"][0];
        println!(
            "Fear & Greed: {} ({})",
            value["value"].as_str().unwrap_or("?"),
            value["value_classification"].as_str().unwrap_or("?")
        );
    }

    let metrics = gateway.metrics().await;
    println!("-------------------------------------------");
    println!(
        "Requests: {}, failed: {}, cache hit rate: {:.0}%, p50: {:.0}ms",
        metrics.total_requests,
        metrics.failed_requests,
        metrics.cache_hit_rate() * 100.0,
        metrics.latency_p50_ms
    );

    while let Ok(notification) = notifications.try_recv() {
        println!("Notification: {notification}");
    }

    Ok(())
}
