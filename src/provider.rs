//! Provider abstraction over the remote market data API

use crate::{
    error::ProviderError,
    types::{CoinProfile, Currency, ExchangeListing, GlobalSnapshot, MarketListing, PricePoint},
};
use async_trait::async_trait;

/// Trait for market data providers
///
/// One method per remote endpoint. Implementations perform exactly one
/// request per call; paging, joining and error mapping happen in
/// [`crate::fetch::MarketDataClient`].
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches one page of coin listings ordered by descending market cap
    async fn fetch_markets(
        &self,
        currency: Currency,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<MarketListing>, ProviderError>;

    /// Fetches the detail record of a single coin
    async fn fetch_coin(&self, id: &str) -> Result<CoinProfile, ProviderError>;

    /// Fetches a coin's price history over the last `days` days
    async fn fetch_coin_chart(
        &self,
        id: &str,
        currency: Currency,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError>;

    /// Fetches the aggregate market snapshot
    async fn fetch_global(&self) -> Result<GlobalSnapshot, ProviderError>;

    /// Fetches the total market cap history over the last `days` days
    async fn fetch_global_market_cap_chart(
        &self,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError>;

    /// Fetches one page of exchange listings
    async fn fetch_exchanges(
        &self,
        per_page: usize,
        page: usize,
    ) -> Result<Vec<ExchangeListing>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use chrono::DateTime;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted failure, turned into a fresh `ProviderError` on every call
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum MockFailure {
        RateLimited,
        ServerError,
        NotFound,
    }

    impl MockFailure {
        fn into_error(self) -> ProviderError {
            match self {
                MockFailure::RateLimited => ProviderError::RateLimitExceeded,
                MockFailure::ServerError => {
                    ProviderError::ApiError("HTTP 500 Internal Server Error".to_string())
                }
                MockFailure::NotFound => ProviderError::NotFound("mock resource".to_string()),
            }
        }
    }

    type Scripted<T> = Mutex<Option<Result<T, MockFailure>>>;

    /// Mock provider for testing
    #[derive(Default)]
    pub struct MockProvider {
        markets: Mutex<HashMap<Currency, Result<Vec<MarketListing>, MockFailure>>>,
        market_delays: Mutex<HashMap<Currency, Duration>>,
        coin: Scripted<CoinProfile>,
        coin_chart: Scripted<Vec<PricePoint>>,
        global: Scripted<GlobalSnapshot>,
        global_chart: Scripted<Vec<PricePoint>>,
        exchange_pages: Mutex<Vec<Result<Vec<ExchangeListing>, MockFailure>>>,
        delay: Mutex<Duration>,
        calls: Mutex<HashMap<&'static str, Vec<String>>>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_markets(&self, currency: Currency, rows: Vec<MarketListing>) {
            self.markets.lock().unwrap().insert(currency, Ok(rows));
        }

        pub fn fail_markets(&self, currency: Currency, failure: MockFailure) {
            self.markets.lock().unwrap().insert(currency, Err(failure));
        }

        /// Delays listing responses for one currency
        pub fn delay_markets(&self, currency: Currency, delay: Duration) {
            self.market_delays.lock().unwrap().insert(currency, delay);
        }

        /// Delays every non-listing response
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = delay;
        }

        pub fn set_coin(&self, result: Result<CoinProfile, MockFailure>) {
            *self.coin.lock().unwrap() = Some(result);
        }

        pub fn set_coin_chart(&self, result: Result<Vec<PricePoint>, MockFailure>) {
            *self.coin_chart.lock().unwrap() = Some(result);
        }

        pub fn set_global(&self, result: Result<GlobalSnapshot, MockFailure>) {
            *self.global.lock().unwrap() = Some(result);
        }

        pub fn set_global_chart(&self, result: Result<Vec<PricePoint>, MockFailure>) {
            *self.global_chart.lock().unwrap() = Some(result);
        }

        /// Responses for exchange pages 1..=n; later pages answer empty
        pub fn set_exchange_pages(&self, pages: Vec<Result<Vec<ExchangeListing>, MockFailure>>) {
            *self.exchange_pages.lock().unwrap() = pages;
        }

        pub fn call_count(&self, endpoint: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(endpoint)
                .map(Vec::len)
                .unwrap_or(0)
        }

        /// Arguments of every call made to an endpoint, in order
        pub fn calls(&self, endpoint: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .get(endpoint)
                .cloned()
                .unwrap_or_default()
        }

        fn record(&self, endpoint: &'static str, args: String) {
            self.calls
                .lock()
                .unwrap()
                .entry(endpoint)
                .or_default()
                .push(args);
        }

        async fn pause(&self) {
            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        fn scripted<T: Clone>(slot: &Scripted<T>) -> Result<T, ProviderError> {
            match slot.lock().unwrap().as_ref() {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(failure)) => Err(failure.into_error()),
                None => Err(MockFailure::NotFound.into_error()),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn fetch_markets(
            &self,
            currency: Currency,
            per_page: usize,
            page: usize,
        ) -> Result<Vec<MarketListing>, ProviderError> {
            self.record("markets", format!("{}:{}:{}", currency.code(), per_page, page));

            let delay = self.market_delays.lock().unwrap().get(&currency).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match self.markets.lock().unwrap().get(&currency) {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(failure)) => Err(failure.into_error()),
                None => Ok(Vec::new()),
            }
        }

        async fn fetch_coin(&self, id: &str) -> Result<CoinProfile, ProviderError> {
            self.record("coin", id.to_string());
            self.pause().await;
            Self::scripted(&self.coin)
        }

        async fn fetch_coin_chart(
            &self,
            id: &str,
            currency: Currency,
            days: u32,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            self.record("coin_chart", format!("{}:{}:{}", id, currency.code(), days));
            self.pause().await;
            Self::scripted(&self.coin_chart)
        }

        async fn fetch_global(&self) -> Result<GlobalSnapshot, ProviderError> {
            self.record("global", String::new());
            self.pause().await;
            Self::scripted(&self.global)
        }

        async fn fetch_global_market_cap_chart(
            &self,
            days: u32,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            self.record("global_chart", days.to_string());
            self.pause().await;
            Self::scripted(&self.global_chart)
        }

        async fn fetch_exchanges(
            &self,
            per_page: usize,
            page: usize,
        ) -> Result<Vec<ExchangeListing>, ProviderError> {
            self.record("exchanges", format!("{}:{}", per_page, page));
            self.pause().await;
            match self.exchange_pages.lock().unwrap().get(page - 1) {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(failure)) => Err(failure.into_error()),
                None => Ok(Vec::new()),
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    // Fixture builders shared by the unit tests

    pub fn listing(id: &str, name: &str, symbol: &str, market_cap: f64) -> MarketListing {
        MarketListing {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: None,
            current_price: Some(market_cap / 1_000_000.0),
            price_change_percentage_24h: Some(1.5),
            market_cap: Some(market_cap),
            total_volume: Some(market_cap / 20.0),
            market_cap_rank: None,
        }
    }

    /// `n` listings in descending market cap order, ids `coin-0..coin-{n-1}`
    pub fn listings(n: usize) -> Vec<MarketListing> {
        (0..n)
            .map(|i| {
                let mut row = listing(
                    &format!("coin-{}", i),
                    &format!("Coin {}", i),
                    &format!("c{}", i),
                    1.0e12 - i as f64 * 1.0e9,
                );
                row.market_cap_rank = Some(i as u32 + 1);
                row
            })
            .collect()
    }

    pub fn exchange(
        id: &str,
        rank: Option<u32>,
        volume_btc: Option<f64>,
        year: Option<i32>,
    ) -> ExchangeListing {
        ExchangeListing {
            id: id.to_string(),
            name: id.to_uppercase(),
            image: None,
            url: None,
            trust_score: Some(10.0),
            trust_score_rank: rank,
            trade_volume_24h_btc_normalized: volume_btc,
            year_established: year,
            country: None,
        }
    }

    /// `n` exchanges whose id carries `prefix` and whose rank starts at `first_rank`
    pub fn exchanges(prefix: &str, first_rank: u32, n: usize) -> Vec<ExchangeListing> {
        (0..n)
            .map(|i| {
                let rank = first_rank + i as u32;
                exchange(
                    &format!("{}-{}", prefix, rank),
                    Some(rank),
                    Some(1000.0 / rank as f64),
                    Some(2010 + (rank % 12) as i32),
                )
            })
            .collect()
    }

    pub fn coin_profile(id: &str) -> CoinProfile {
        let per_currency = |usd: f64| {
            HashMap::from([
                ("usd".to_string(), usd),
                ("eur".to_string(), usd * 0.9),
                ("gbp".to_string(), usd * 0.8),
            ])
        };
        CoinProfile {
            id: id.to_string(),
            symbol: "btc".to_string(),
            name: "Bitcoin".to_string(),
            image: None,
            market_cap_rank: Some(1),
            current_price: per_currency(70_000.0),
            market_cap: per_currency(1.38e12),
            total_volume: per_currency(2.4e10),
            price_change_24h: per_currency(2.0),
            circulating_supply: Some(19_700_000.0),
            total_supply: Some(21_000_000.0),
            max_supply: Some(21_000_000.0),
            description: Some("The first cryptocurrency.".to_string()),
        }
    }

    pub fn series(values: &[f64]) -> Vec<PricePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let ts = DateTime::from_timestamp(1_700_000_000 + i as i64 * 86_400, 0)
                    .unwrap_or_default();
                PricePoint::new(ts, *v)
            })
            .collect()
    }

    pub fn global_snapshot() -> GlobalSnapshot {
        GlobalSnapshot {
            active_cryptocurrencies: 13_500,
            markets: 1_100,
            total_market_cap: HashMap::from([
                ("usd".to_string(), 2.5e12),
                ("eur".to_string(), 2.3e12),
            ]),
            total_volume: HashMap::from([("usd".to_string(), 9.0e10)]),
            market_cap_percentage: HashMap::from([
                ("btc".to_string(), 52.4),
                ("eth".to_string(), 16.8),
            ]),
            market_cap_change_percentage_24h_usd: Some(-1.2),
        }
    }
}
