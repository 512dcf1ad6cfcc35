//! Data fetch adapter
//!
//! Turns provider calls into the four logical datasets the views consume.
//! Each operation is a single fetch cycle: no caching, no retry. Joined
//! requests are issued concurrently and fail as a whole.

use crate::{
    config::ClientConfig,
    constants::{
        EXCHANGES_PER_REQUEST, EXCHANGE_MAX_PAGES, GLOBAL_CHART_DAYS, MARKETS_PER_PAGE,
    },
    error::{FetchError, ProviderError},
    metrics::{DatasetMetrics, MetricsCollector, Outcome},
    provider::MarketDataProvider,
    providers::CoinGeckoProvider,
    types::{CoinDetail, Currency, Dataset, ExchangeListing, GlobalStats, MarketListing, TimeRange},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Client exposing one method per logical dataset
#[derive(Clone)]
pub struct MarketDataClient {
    provider: Arc<dyn MarketDataProvider>,
    metrics: Arc<MetricsCollector>,
}

impl MarketDataClient {
    /// Creates a client backed by CoinGecko
    pub fn coingecko(config: &ClientConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_provider(Arc::new(CoinGeckoProvider::new(config)?)))
    }

    /// Creates a client with a custom provider
    ///
    /// This is primarily for testing with mock providers.
    pub fn with_provider(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Returns the name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Gets request metrics for one dataset
    pub async fn metrics(&self, dataset: Dataset) -> DatasetMetrics {
        self.metrics.snapshot(dataset).await
    }

    /// Fetches the top coins by market cap, priced in `currency`
    #[instrument(skip_all, fields(currency = currency.code()))]
    pub async fn fetch_market_listings(
        &self,
        currency: Currency,
    ) -> Result<Vec<MarketListing>, FetchError> {
        let start = Instant::now();
        let result = self
            .provider
            .fetch_markets(currency, MARKETS_PER_PAGE, 1)
            .await
            .map_err(|e| FetchError::from_provider(Dataset::Markets, e));

        self.finish(Dataset::Markets, start, result, |rows| rows.len())
            .await
    }

    /// Fetches a coin's detail and its price history for `range`
    ///
    /// Both requests run concurrently; if either fails the whole result fails.
    #[instrument(skip_all, fields(id = %id, currency = currency.code(), days = range.days()))]
    pub async fn fetch_coin_detail(
        &self,
        id: &str,
        currency: Currency,
        range: TimeRange,
    ) -> Result<CoinDetail, FetchError> {
        let start = Instant::now();
        let dataset = Dataset::CoinDetail;

        let (profile, prices) = futures::join!(
            self.provider.fetch_coin(id),
            self.provider.fetch_coin_chart(id, currency, range.days()),
        );

        let result = match (profile, prices) {
            (Ok(profile), Ok(prices)) => Ok(CoinDetail {
                profile,
                currency,
                range,
                prices,
            }),
            (Err(e), _) => Err(FetchError::partial(
                dataset,
                "coin detail",
                FetchError::from_provider(dataset, e),
            )),
            (Ok(_), Err(e)) => Err(FetchError::partial(
                dataset,
                "price history",
                FetchError::from_provider(dataset, e),
            )),
        };

        self.finish(dataset, start, result, |detail| detail.prices.len())
            .await
    }

    /// Fetches the global snapshot and the 90-day market cap series
    ///
    /// Both requests run concurrently; if either fails the whole result fails.
    #[instrument(skip_all)]
    pub async fn fetch_global_stats(&self) -> Result<GlobalStats, FetchError> {
        let start = Instant::now();
        let dataset = Dataset::GlobalStats;

        let (snapshot, series) = futures::join!(
            self.provider.fetch_global(),
            self.provider.fetch_global_market_cap_chart(GLOBAL_CHART_DAYS),
        );

        let result = match (snapshot, series) {
            (Ok(snapshot), Ok(market_cap_series)) => Ok(GlobalStats {
                snapshot,
                market_cap_series,
            }),
            (Err(e), _) => Err(FetchError::partial(
                dataset,
                "global snapshot",
                FetchError::from_provider(dataset, e),
            )),
            (Ok(_), Err(e)) => Err(FetchError::partial(
                dataset,
                "market cap chart",
                FetchError::from_provider(dataset, e),
            )),
        };

        self.finish(dataset, start, result, |stats| stats.market_cap_series.len())
            .await
    }

    /// Fetches exchange listings page by page
    ///
    /// Stops after a short page or after `EXCHANGE_MAX_PAGES` pages. Any
    /// failing page fails the whole listing.
    #[instrument(skip_all)]
    pub async fn fetch_exchange_listings(&self) -> Result<Vec<ExchangeListing>, FetchError> {
        let start = Instant::now();
        let result = self.fetch_exchange_pages().await;
        self.finish(Dataset::Exchanges, start, result, |rows| rows.len())
            .await
    }

    async fn fetch_exchange_pages(&self) -> Result<Vec<ExchangeListing>, FetchError> {
        let mut exchanges = Vec::new();

        for page in 1..=EXCHANGE_MAX_PAGES {
            let rows = self
                .provider
                .fetch_exchanges(EXCHANGES_PER_REQUEST, page)
                .await
                .map_err(|e| FetchError::from_provider(Dataset::Exchanges, e))?;

            let fetched = rows.len();
            tracing::debug!(page, fetched, "Fetched exchange page");
            exchanges.extend(rows);

            if fetched < EXCHANGES_PER_REQUEST {
                break;
            }
        }

        Ok(exchanges)
    }

    /// Logs and records the outcome of one fetch operation
    async fn finish<T>(
        &self,
        dataset: Dataset,
        start: Instant,
        result: Result<T, FetchError>,
        count: impl Fn(&T) -> usize,
    ) -> Result<T, FetchError> {
        let elapsed = start.elapsed();
        let outcome = match &result {
            Ok(value) => {
                tracing::info!(
                    dataset = dataset.key(),
                    count = count(value),
                    provider = self.provider_name(),
                    latency_ms = elapsed.as_millis() as u64,
                    "Fetched dataset"
                );
                Outcome::Success
            }
            Err(e) => {
                tracing::warn!(dataset = dataset.key(), error = %e, "Fetch failed");
                if e.is_rate_limited() {
                    Outcome::RateLimited
                } else {
                    Outcome::Failure
                }
            }
        };
        self.metrics.record(dataset, elapsed, outcome).await;
        result
    }
}
