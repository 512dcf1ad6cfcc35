//! CoinGecko market data provider implementation

use crate::{
    config::ClientConfig,
    constants::{
        COINGECKO_COINS_ENDPOINT, COINGECKO_EXCHANGES_ENDPOINT, COINGECKO_GLOBAL_CHART_ENDPOINT,
        COINGECKO_GLOBAL_ENDPOINT, COINGECKO_MARKETS_ENDPOINT, COINGECKO_MARKET_CHART_SEGMENT,
        MARKETS_ORDER,
    },
    error::ProviderError,
    provider::MarketDataProvider,
    types::{CoinProfile, Currency, ExchangeListing, GlobalSnapshot, MarketListing, PricePoint},
};
use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// CoinGecko response for `/coins/{id}`
#[derive(Debug, Deserialize)]
struct CoinResponse {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    image: Option<CoinImage>,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    description: HashMap<String, Option<String>>,
    market_data: CoinMarketData,
}

#[derive(Debug, Deserialize)]
struct CoinImage {
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    #[serde(default)]
    current_price: HashMap<String, f64>,
    #[serde(default)]
    market_cap: HashMap<String, f64>,
    #[serde(default)]
    total_volume: HashMap<String, f64>,
    #[serde(default)]
    price_change_percentage_24h_in_currency: HashMap<String, f64>,
    #[serde(default)]
    circulating_supply: Option<f64>,
    #[serde(default)]
    total_supply: Option<f64>,
    #[serde(default)]
    max_supply: Option<f64>,
}

impl From<CoinResponse> for CoinProfile {
    fn from(raw: CoinResponse) -> Self {
        let description = raw
            .description
            .get("en")
            .cloned()
            .flatten()
            .filter(|text| !text.trim().is_empty());
        let image = raw.image.and_then(|img| img.large.or(img.small));

        CoinProfile {
            id: raw.id,
            symbol: raw.symbol,
            name: raw.name,
            image,
            market_cap_rank: raw.market_cap_rank,
            current_price: raw.market_data.current_price,
            market_cap: raw.market_data.market_cap,
            total_volume: raw.market_data.total_volume,
            price_change_24h: raw.market_data.price_change_percentage_24h_in_currency,
            circulating_supply: raw.market_data.circulating_supply,
            total_supply: raw.market_data.total_supply,
            max_supply: raw.market_data.max_supply,
            description,
        }
    }
}

/// CoinGecko response for `/coins/{id}/market_chart`
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<PricePoint>,
}

/// CoinGecko response for `/global`
#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalSnapshot,
}

/// CoinGecko response for `/global/market_cap_chart`
///
/// The documented shape nests the series under `market_cap_chart`; a flat
/// `market_caps` array is also accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlobalChartResponse {
    Nested { market_cap_chart: GlobalChartSeries },
    Flat { market_caps: Vec<PricePoint> },
}

#[derive(Debug, Deserialize)]
struct GlobalChartSeries {
    market_cap: Vec<PricePoint>,
}

impl GlobalChartResponse {
    fn into_points(self) -> Vec<PricePoint> {
        match self {
            GlobalChartResponse::Nested { market_cap_chart } => market_cap_chart.market_cap,
            GlobalChartResponse::Flat { market_caps } => market_caps,
        }
    }
}

/// CoinGecko market data provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: Url,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider from the given settings
    pub fn new(config: &ClientConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self { client, base_url })
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds a GET request for an endpoint with query parameters
    fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Request, ProviderError> {
        let mut builder = self.client.get(self.endpoint(segments)?);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder.build().map_err(ProviderError::NetworkError)
    }

    fn markets_request(
        &self,
        currency: Currency,
        per_page: usize,
        page: usize,
    ) -> Result<Request, ProviderError> {
        self.get(
            COINGECKO_MARKETS_ENDPOINT,
            &[
                ("vs_currency", currency.code().to_string()),
                ("order", MARKETS_ORDER.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
    }

    fn coin_request(&self, id: &str) -> Result<Request, ProviderError> {
        let segments: Vec<&str> = COINGECKO_COINS_ENDPOINT.iter().copied().chain([id]).collect();
        self.get(&segments, &[])
    }

    fn coin_chart_request(
        &self,
        id: &str,
        currency: Currency,
        days: u32,
    ) -> Result<Request, ProviderError> {
        let segments: Vec<&str> = COINGECKO_COINS_ENDPOINT
            .iter()
            .copied()
            .chain([id, COINGECKO_MARKET_CHART_SEGMENT])
            .collect();
        self.get(
            &segments,
            &[
                ("vs_currency", currency.code().to_string()),
                ("days", days.to_string()),
            ],
        )
    }

    fn global_chart_request(&self, days: u32) -> Result<Request, ProviderError> {
        self.get(COINGECKO_GLOBAL_CHART_ENDPOINT, &[("days", days.to_string())])
    }

    fn exchanges_request(&self, per_page: usize, page: usize) -> Result<Request, ProviderError> {
        self.get(
            COINGECKO_EXCHANGES_ENDPOINT,
            &[("per_page", per_page.to_string()), ("page", page.to_string())],
        )
    }

    /// Sends a request and decodes the JSON body
    ///
    /// A 404 is `NotFound(missing)` when the endpoint is keyed by an
    /// identifier, and a plain API error otherwise.
    async fn get_json<T: DeserializeOwned>(
        &self,
        request: Request,
        missing: Option<String>,
    ) -> Result<T, ProviderError> {
        tracing::debug!(url = %request.url(), "Requesting CoinGecko");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(ProviderError::NetworkError)?;

        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(what) = missing {
                return Err(ProviderError::NotFound(what));
            }
        }

        // Check for other errors
        if !status.is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response.text().await.map_err(ProviderError::NetworkError)?;
        decode(&response_text)
    }
}

/// Parses a CoinGecko JSON payload
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        ProviderError::InvalidResponse(format!(
            "Failed to parse CoinGecko response: {}. Response: {}",
            e, preview
        ))
    })
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets(
        &self,
        currency: Currency,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<MarketListing>, ProviderError> {
        let request = self.markets_request(currency, per_page, page)?;
        self.get_json(request, None).await
    }

    async fn fetch_coin(&self, id: &str) -> Result<CoinProfile, ProviderError> {
        let request = self.coin_request(id)?;
        let raw: CoinResponse = self.get_json(request, Some(format!("coin {}", id))).await?;
        Ok(raw.into())
    }

    async fn fetch_coin_chart(
        &self,
        id: &str,
        currency: Currency,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let request = self.coin_chart_request(id, currency, days)?;
        let chart: MarketChartResponse =
            self.get_json(request, Some(format!("coin {}", id))).await?;
        Ok(chart.prices)
    }

    async fn fetch_global(&self) -> Result<GlobalSnapshot, ProviderError> {
        let request = self.get(COINGECKO_GLOBAL_ENDPOINT, &[])?;
        let global: GlobalResponse = self.get_json(request, None).await?;
        Ok(global.data)
    }

    async fn fetch_global_market_cap_chart(
        &self,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let request = self.global_chart_request(days)?;
        let chart: GlobalChartResponse = self.get_json(request, None).await?;
        Ok(chart.into_points())
    }

    async fn fetch_exchanges(
        &self,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<ExchangeListing>, ProviderError> {
        let request = self.exchanges_request(per_page, page)?;
        self.get_json(request, None).await
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
