//! Upstream request descriptions, one constructor per gateway operation

use crate::{
    cache::CacheKey,
    constants::VS_CURRENCY,
    types::{Operation, Upstream},
};

/// Everything needed to issue, cache and report one upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub operation: Operation,
    pub upstream: Upstream,
    /// Path relative to the upstream base URL, starting with `/`
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    /// `None` for operations that are never cached
    pub cache_key: Option<CacheKey>,
    /// What is being loaded, used in failure notifications
    pub subject: String,
}

/// Page number holding the 1-based `start_index` for the given page size
///
/// Both inputs are clamped to at least 1.
pub fn page_for(page_size: u32, start_index: u32) -> u32 {
    let page_size = page_size.max(1);
    let start_index = start_index.max(1);
    start_index.div_ceil(page_size)
}

/// Trims, drops empty ids, sorts and de-duplicates
pub fn normalize_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut ids: Vec<String> = ids
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn market_query() -> Vec<(&'static str, String)> {
    vec![
        ("vs_currency", VS_CURRENCY.to_string()),
        ("order", "market_cap_desc".to_string()),
    ]
}

fn market_display_query() -> [(&'static str, String); 3] {
    [
        ("sparkline", "true".to_string()),
        ("price_change_percentage", "24h".to_string()),
        ("locale", "en".to_string()),
    ]
}

impl ApiRequest {
    /// `GET /coins/markets` for one page of the market-cap ranking
    pub fn market_data(page_size: u32, start_index: u32) -> Self {
        let page_size = page_size.max(1);
        let page = page_for(page_size, start_index);

        let mut query = market_query();
        query.push(("per_page", page_size.to_string()));
        query.push(("page", page.to_string()));
        query.extend(market_display_query());

        Self {
            operation: Operation::MarketData,
            upstream: Upstream::CoinGecko,
            path: "/coins/markets".to_string(),
            query,
            cache_key: Some(CacheKey::market_data(page_size, page)),
            subject: "market data".to_string(),
        }
    }

    /// `GET /coins/list`
    pub fn coins_list() -> Self {
        Self {
            operation: Operation::CoinsList,
            upstream: Upstream::CoinGecko,
            path: "/coins/list".to_string(),
            query: Vec::new(),
            cache_key: None,
            subject: "coins list".to_string(),
        }
    }

    /// `GET /simple/price` for already normalized ids
    pub fn price_data(ids: &[String]) -> Self {
        Self {
            operation: Operation::PriceData,
            upstream: Upstream::CoinGecko,
            path: "/simple/price".to_string(),
            query: vec![
                ("ids", ids.join(",")),
                ("vs_currencies", VS_CURRENCY.to_string()),
                ("include_24hr_change", "true".to_string()),
            ],
            cache_key: None,
            subject: "price data".to_string(),
        }
    }

    /// `GET /coins/{id}` with the full payload
    pub fn coin_data(coin_id: &str) -> Self {
        Self {
            operation: Operation::CoinData,
            upstream: Upstream::CoinGecko,
            path: format!("/coins/{coin_id}"),
            query: Vec::new(),
            cache_key: Some(CacheKey::coin_data(coin_id)),
            subject: format!("data for {coin_id}"),
        }
    }

    /// `GET /coins/{id}` with tickers, market, community and developer data stripped
    pub fn coin_details(coin_id: &str) -> Self {
        let query = [
            "localization",
            "tickers",
            "market_data",
            "community_data",
            "developer_data",
            "sparkline",
        ]
        .into_iter()
        .map(|field| (field, "false".to_string()))
        .collect();

        Self {
            operation: Operation::CoinDetails,
            upstream: Upstream::CoinGecko,
            path: format!("/coins/{coin_id}"),
            query,
            cache_key: Some(CacheKey::details(coin_id)),
            subject: format!("details for {coin_id}"),
        }
    }

    /// `GET /coins/{id}/market_chart` with daily points
    pub fn historical_data(coin_id: &str, days: u32) -> Self {
        Self {
            operation: Operation::HistoricalData,
            upstream: Upstream::CoinGecko,
            path: format!("/coins/{coin_id}/market_chart"),
            query: vec![
                ("vs_currency", VS_CURRENCY.to_string()),
                ("days", days.to_string()),
                ("interval", "daily".to_string()),
            ],
            cache_key: Some(CacheKey::historical(coin_id, days)),
            subject: format!("chart data for {coin_id}"),
        }
    }

    /// `GET /coins/markets` restricted to already normalized ids
    pub fn watchlist_data(ids: &[String]) -> Self {
        let mut query = vec![
            ("vs_currency", VS_CURRENCY.to_string()),
            ("ids", ids.join(",")),
            ("order", "market_cap_desc".to_string()),
        ];
        query.extend(market_display_query());

        Self {
            operation: Operation::WatchlistData,
            upstream: Upstream::CoinGecko,
            path: "/coins/markets".to_string(),
            query,
            cache_key: Some(CacheKey::watchlist(ids)),
            subject: "watchlist data".to_string(),
        }
    }

    /// `GET /fng/` on the sentiment host
    pub fn fear_greed_index() -> Self {
        Self {
            operation: Operation::FearGreedIndex,
            upstream: Upstream::FearGreed,
            path: "/fng/".to_string(),
            query: Vec::new(),
            cache_key: Some(CacheKey::fear_greed_index()),
            subject: "Fear & Greed Index".to_string(),
        }
    }

    /// Value of a query parameter, if present
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_for() {
        assert_eq!(page_for(25, 1), 1);
        assert_eq!(page_for(25, 25), 1);
        assert_eq!(page_for(25, 26), 2);
        assert_eq!(page_for(50, 101), 3);
        assert_eq!(page_for(0, 0), 1);
    }

    #[test]
    fn test_market_data_request() {
        let request = ApiRequest::market_data(25, 26);

        assert_eq!(request.path, "/coins/markets");
        assert_eq!(request.query_param("per_page"), Some("25"));
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("sparkline"), Some("true"));
        assert_eq!(request.query_param("locale"), Some("en"));
        assert_eq!(
            request.cache_key.unwrap().as_str(),
            "market_data_25_page_2"
        );
    }

    #[test]
    fn test_normalize_ids_is_order_independent() {
        let a = normalize_ids(&["ethereum", "bitcoin"]);
        let b = normalize_ids(&["bitcoin", " ethereum ", "", "bitcoin"]);

        assert_eq!(a, vec!["bitcoin".to_string(), "ethereum".to_string()]);
        assert_eq!(a, b);
        assert_eq!(
            ApiRequest::watchlist_data(&a).cache_key,
            ApiRequest::watchlist_data(&b).cache_key
        );
    }

    #[test]
    fn test_coin_details_strips_market_fields() {
        let request = ApiRequest::coin_details("bitcoin");

        assert_eq!(request.path, "/coins/bitcoin");
        for field in ["localization", "tickers", "market_data", "sparkline"] {
            assert_eq!(request.query_param(field), Some("false"));
        }
        assert_eq!(request.cache_key.unwrap().as_str(), "details_bitcoin");
    }

    #[test]
    fn test_historical_request() {
        let request = ApiRequest::historical_data("bitcoin", 30);

        assert_eq!(request.path, "/coins/bitcoin/market_chart");
        assert_eq!(request.query_param("days"), Some("30"));
        assert_eq!(request.query_param("interval"), Some("daily"));
        assert_eq!(request.subject, "chart data for bitcoin");
    }

    #[test]
    fn test_uncached_requests() {
        assert!(ApiRequest::coins_list().cache_key.is_none());
        assert!(ApiRequest::price_data(&["bitcoin".to_string()]).cache_key.is_none());
    }

    #[test]
    fn test_fear_greed_uses_other_host() {
        let request = ApiRequest::fear_greed_index();
        assert_eq!(request.upstream, Upstream::FearGreed);
        assert_eq!(request.path, "/fng/");
        assert!(request.query.is_empty());
    }
}
