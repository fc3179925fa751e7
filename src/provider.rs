//! Provider abstraction for issuing requests against the market-data APIs

use crate::{error::GatewayError, request::ApiRequest, types::Payload};
use async_trait::async_trait;

/// Trait for market data providers
///
/// A provider performs exactly one upstream call per `fetch` and classifies
/// its failure. Caching and rate limiting live in the gateway, not here.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Issues the request and returns the decoded JSON body
    async fn fetch(&self, request: &ApiRequest) -> Result<Payload, GatewayError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
