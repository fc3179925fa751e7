//! HTTP provider backed by reqwest

use crate::{
    config::GatewayConfig,
    error::GatewayError,
    provider::MarketDataProvider,
    request::ApiRequest,
    types::Payload,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Provider issuing real HTTP requests to CoinGecko and Alternative.me
pub struct HttpProvider {
    client: Client,
    config: GatewayConfig,
}

impl HttpProvider {
    /// Creates a provider using the URLs, timeout and user agent of `config`
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Builds the absolute URL for a request, without its query string
    fn build_url(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.config.base_url(request.upstream), request.path)
    }
}

#[async_trait]
impl MarketDataProvider for HttpProvider {
    async fn fetch(&self, request: &ApiRequest) -> Result<Payload, GatewayError> {
        let url = self.build_url(request);
        tracing::debug!(url = %url, operation = %request.operation, "Sending upstream request");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&request.query)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }

        // Check for other errors
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::status(status.as_u16(), body));
        }

        let response_text = response.text().await?;

        serde_json::from_str(&response_text).map_err(|e| {
            GatewayError::malformed(format!(
                "Failed to parse {} response: {}",
                request.operation, e
            ))
        })
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_per_upstream() {
        let config = GatewayConfig::default()
            .with_coingecko_api_url("http://cg.local/api/v3")
            .with_fear_greed_api_url("http://fng.local");
        let provider = HttpProvider::new(&config).unwrap();

        assert_eq!(
            provider.build_url(&ApiRequest::historical_data("bitcoin", 7)),
            "http://cg.local/api/v3/coins/bitcoin/market_chart"
        );
        assert_eq!(
            provider.build_url(&ApiRequest::fear_greed_index()),
            "http://fng.local/fng/"
        );
    }
}
