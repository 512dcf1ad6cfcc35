//! Per-view controllers and the application session
//!
//! Each screen owns its own fetch state. Screens that read session-wide data
//! (overview, analytics, exchanges) go through [`SharedMarketData`] instead.

use crate::{
    constants::EXCHANGES_PER_PAGE,
    fetch::MarketDataClient,
    state::{FetchState, Snapshot, ViewState},
    store::SharedMarketData,
    types::{
        CoinDetail, Currency, ExchangeListing, GlobalStats, MarketListing, PricePoint, TimeRange,
    },
    views::{
        downsample, filter_listings, sort_exchanges, summarize, Paginator, SeriesSummary,
        SortConfig, SortKey,
    },
};
use std::sync::Arc;
use tokio::sync::watch;

/// Coin listings together with the currency they are priced in
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTable {
    pub currency: Currency,
    pub rows: Vec<MarketListing>,
}

/// Top coins by market cap with a search box
pub struct MarketsScreen {
    client: MarketDataClient,
    state: ViewState<MarketTable>,
    search: String,
}

impl MarketsScreen {
    pub fn new(client: MarketDataClient) -> Self {
        Self {
            client,
            state: ViewState::new(),
            search: String::new(),
        }
    }

    /// Fetches listings priced in `currency`, superseding any load in flight
    ///
    /// Returns false if a newer load started before this one finished.
    pub async fn load(&self, currency: Currency) -> bool {
        let ticket = self.state.begin();
        let result = self
            .client
            .fetch_market_listings(currency)
            .await
            .map(|rows| MarketTable { currency, rows });
        self.state.complete(ticket, result)
    }

    /// Search text only narrows the already fetched rows
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn state(&self) -> FetchState<Arc<MarketTable>> {
        self.state.current()
    }

    /// Rows matching the current search
    pub fn visible(&self) -> FetchState<MarketTable> {
        self.state.current().map(|table| MarketTable {
            currency: table.currency,
            rows: filter_listings(&table.rows, &self.search)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<MarketTable>> {
        self.state.subscribe()
    }
}

/// A single coin with its price chart
pub struct CoinDetailScreen {
    client: MarketDataClient,
    id: String,
    range: TimeRange,
    state: ViewState<CoinDetail>,
}

impl CoinDetailScreen {
    pub fn new(client: MarketDataClient, id: impl Into<String>, range: TimeRange) -> Self {
        Self {
            client,
            id: id.into(),
            range,
            state: ViewState::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Changes the chart range; takes effect on the next `load`
    pub fn set_range(&mut self, range: TimeRange) {
        self.range = range;
    }

    pub async fn load(&self, currency: Currency) -> bool {
        let ticket = self.state.begin();
        let result = self
            .client
            .fetch_coin_detail(&self.id, currency, self.range)
            .await;
        self.state.complete(ticket, result)
    }

    pub fn state(&self) -> FetchState<Arc<CoinDetail>> {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<CoinDetail>> {
        self.state.subscribe()
    }
}

/// One display page of the sorted exchange table
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangePage {
    pub rows: Vec<ExchangeListing>,
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub sort: SortConfig,
}

/// Exchange rankings over the shared listing
pub struct ExchangesScreen {
    shared: Arc<SharedMarketData>,
    sort: SortConfig,
    paginator: Paginator,
}

impl ExchangesScreen {
    pub fn new(shared: Arc<SharedMarketData>) -> Self {
        Self {
            shared,
            sort: SortConfig::default(),
            paginator: Paginator::new(EXCHANGES_PER_PAGE),
        }
    }

    /// Waits for the shared listing; fetched once per session
    pub async fn load(&self) -> FetchState<Arc<Vec<ExchangeListing>>> {
        self.shared.exchanges().await.into()
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    /// Selects a sort column and returns to the first page
    pub fn request_sort(&mut self, key: SortKey) {
        self.sort = self.sort.request(key);
        self.paginator.reset();
    }

    pub fn page(&self) -> usize {
        self.paginator.page()
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.total_rows();
        self.paginator.set_page(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.total_rows();
        self.paginator.next(total);
    }

    pub fn previous_page(&mut self) {
        let total = self.total_rows();
        self.paginator.previous(total);
    }

    /// The current page of the sorted listing
    pub fn visible(&self) -> FetchState<ExchangePage> {
        self.shared.exchanges_state().map(|rows| {
            let sorted = sort_exchanges(&rows, self.sort);
            let page = self.paginator.slice(&sorted);
            ExchangePage {
                rows: page.rows.iter().map(|row| (*row).clone()).collect(),
                page: page.page,
                total_pages: page.total_pages,
                total_rows: page.total_rows,
                sort: self.sort,
            }
        })
    }

    fn total_rows(&self) -> usize {
        self.shared
            .exchanges_state()
            .ready()
            .map(|rows| rows.len())
            .unwrap_or(0)
    }
}

/// Headline market figures in one currency
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverview {
    pub currency: Currency,
    pub total_market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub btc_dominance: Option<f64>,
    pub eth_dominance: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub active_cryptocurrencies: u64,
    pub markets: u64,
}

impl MarketOverview {
    pub fn from_stats(stats: &GlobalStats, currency: Currency) -> Self {
        let snapshot = &stats.snapshot;
        Self {
            currency,
            total_market_cap: snapshot.total_market_cap_in(currency),
            total_volume: snapshot.total_volume_in(currency),
            btc_dominance: snapshot.dominance("btc"),
            eth_dominance: snapshot.dominance("eth"),
            market_cap_change_24h: snapshot.market_cap_change_percentage_24h_usd,
            active_cryptocurrencies: snapshot.active_cryptocurrencies,
            markets: snapshot.markets,
        }
    }
}

/// 90-day market cap trend
#[derive(Debug, Clone, PartialEq)]
pub struct MarketAnalytics {
    pub summary: Option<SeriesSummary>,
    pub series: Vec<PricePoint>,
}

impl MarketAnalytics {
    pub fn from_stats(stats: &GlobalStats, chart_points: usize) -> Self {
        Self {
            summary: summarize(&stats.market_cap_series),
            series: downsample(&stats.market_cap_series, chart_points),
        }
    }
}

/// State shared by every screen of one application run
///
/// Owns the active currency and the shared data provider. Changing the
/// currency reloads every screen whose data depends on it.
pub struct AppSession {
    currency: Currency,
    client: MarketDataClient,
    shared: Arc<SharedMarketData>,
    markets: MarketsScreen,
    detail: Option<CoinDetailScreen>,
}

impl AppSession {
    pub fn new(client: MarketDataClient, currency: Currency) -> Self {
        Self {
            currency,
            shared: Arc::new(SharedMarketData::new(client.clone())),
            markets: MarketsScreen::new(client.clone()),
            client,
            detail: None,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn client(&self) -> &MarketDataClient {
        &self.client
    }

    pub fn shared(&self) -> Arc<SharedMarketData> {
        self.shared.clone()
    }

    pub fn markets(&self) -> &MarketsScreen {
        &self.markets
    }

    pub fn markets_mut(&mut self) -> &mut MarketsScreen {
        &mut self.markets
    }

    pub fn detail(&self) -> Option<&CoinDetailScreen> {
        self.detail.as_ref()
    }

    /// Loads listings in the active currency
    pub async fn load_markets(&self) -> bool {
        self.markets.load(self.currency).await
    }

    /// Opens a coin, replacing any coin that was open, and loads it
    pub async fn open_coin(&mut self, id: &str, range: TimeRange) -> &CoinDetailScreen {
        let currency = self.currency;
        let screen = self
            .detail
            .insert(CoinDetailScreen::new(self.client.clone(), id, range));
        screen.load(currency).await;
        screen
    }

    /// Changes the chart range of the open coin and reloads it
    pub async fn set_coin_range(&mut self, range: TimeRange) {
        let currency = self.currency;
        if let Some(screen) = self.detail.as_mut() {
            screen.set_range(range);
            screen.load(currency).await;
        }
    }

    pub fn close_coin(&mut self) {
        self.detail = None;
    }

    /// Switches the active currency and reloads currency-dependent screens
    ///
    /// Shared global data is keyed by currency rather than fetched per
    /// currency, so it is not reloaded.
    pub async fn set_currency(&mut self, currency: Currency) {
        tracing::info!(from = %self.currency, to = %currency, "Changing currency");
        self.currency = currency;

        match &self.detail {
            Some(detail) => {
                futures::join!(self.markets.load(currency), detail.load(currency));
            }
            None => {
                self.markets.load(currency).await;
            }
        }
    }

    pub fn exchanges(&self) -> ExchangesScreen {
        ExchangesScreen::new(self.shared.clone())
    }

    pub async fn overview(&self) -> FetchState<MarketOverview> {
        let currency = self.currency;
        FetchState::from(self.shared.global_stats().await)
            .map(|stats| MarketOverview::from_stats(&stats, currency))
    }

    pub async fn analytics(&self, chart_points: usize) -> FetchState<MarketAnalytics> {
        FetchState::from(self.shared.global_stats().await)
            .map(|stats| MarketAnalytics::from_stats(&stats, chart_points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::provider::mock::{
        coin_profile, exchange, exchanges, global_snapshot, listing, listings, series,
        MockFailure, MockProvider,
    };
    use std::time::Duration;

    fn client(mock: &Arc<MockProvider>) -> MarketDataClient {
        MarketDataClient::with_provider(mock.clone())
    }

    #[tokio::test]
    async fn test_late_response_does_not_overwrite_newer_currency() {
        let mock = Arc::new(MockProvider::new());
        mock.set_markets(Currency::Usd, listings(3));
        mock.set_markets(Currency::Eur, listings(5));
        mock.delay_markets(Currency::Usd, Duration::from_millis(80));
        let screen = MarketsScreen::new(client(&mock));

        let (usd_applied, eur_applied) =
            tokio::join!(screen.load(Currency::Usd), screen.load(Currency::Eur));

        assert!(!usd_applied);
        assert!(eur_applied);
        let table = screen.state();
        let table = table.ready().unwrap();
        assert_eq!(table.currency, Currency::Eur);
        assert_eq!(table.rows.len(), 5);
        assert_eq!(mock.call_count("markets"), 2);
    }

    #[tokio::test]
    async fn test_search_narrows_loaded_rows() {
        let mock = Arc::new(MockProvider::new());
        let mut rows = listings(20);
        rows.push(listing("bitcoin", "Bitcoin", "btc", 1.0));
        mock.set_markets(Currency::Usd, rows);
        let mut screen = MarketsScreen::new(client(&mock));
        screen.load(Currency::Usd).await;

        assert_eq!(screen.visible().ready().map(|t| t.rows.len()), Some(10));

        screen.set_search("BTC");
        let visible = screen.visible();
        let ids: Vec<&str> = visible
            .ready()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bitcoin"]);
        assert_eq!(mock.call_count("markets"), 1);
    }

    #[tokio::test]
    async fn test_currency_change_goes_through_pending() {
        let mock = Arc::new(MockProvider::new());
        mock.set_markets(Currency::Usd, listings(2));
        mock.set_markets(Currency::Eur, listings(4));
        mock.delay_markets(Currency::Eur, Duration::from_millis(30));
        let mut session = AppSession::new(client(&mock), Currency::Usd);
        session.load_markets().await;
        assert!(session.markets().state().is_ready());

        let mut rx = session.markets().subscribe();
        rx.borrow_and_update();

        let observer = async {
            rx.changed().await.unwrap();
            let pending = rx.borrow_and_update().state.is_pending();
            rx.changed().await.unwrap();
            let ready = rx.borrow_and_update().state.clone();
            (pending, ready)
        };
        let ((), (saw_pending, ready)) = tokio::join!(session.set_currency(Currency::Eur), observer);

        assert!(saw_pending);
        assert_eq!(ready.ready().map(|t| t.currency), Some(Currency::Eur));
        assert_eq!(session.currency(), Currency::Eur);
    }

    #[tokio::test]
    async fn test_currency_change_reloads_open_coin_only() {
        let mock = Arc::new(MockProvider::new());
        mock.set_markets(Currency::Usd, listings(2));
        mock.set_markets(Currency::Gbp, listings(2));
        mock.set_coin(Ok(coin_profile("bitcoin")));
        mock.set_coin_chart(Ok(series(&[1.0, 2.0])));
        mock.set_global(Ok(global_snapshot()));
        mock.set_global_chart(Ok(series(&[1.0])));
        let mut session = AppSession::new(client(&mock), Currency::Usd);

        session.open_coin("bitcoin", TimeRange::Week).await;
        session.overview().await;
        session.set_currency(Currency::Gbp).await;

        assert_eq!(
            mock.calls("coin_chart"),
            vec!["bitcoin:usd:7".to_string(), "bitcoin:gbp:7".to_string()]
        );
        assert_eq!(mock.calls("markets"), vec!["gbp:100:1".to_string()]);
        assert_eq!(mock.call_count("global"), 1);

        let detail = session.detail().unwrap().state();
        assert_eq!(detail.ready().map(|d| d.currency), Some(Currency::Gbp));
    }

    #[tokio::test]
    async fn test_coin_detail_partial_failure() {
        let mock = Arc::new(MockProvider::new());
        mock.set_coin(Ok(coin_profile("bitcoin")));
        mock.set_coin_chart(Err(MockFailure::ServerError));
        let screen = CoinDetailScreen::new(client(&mock), "bitcoin", TimeRange::Day);

        screen.load(Currency::Usd).await;

        let state = screen.state();
        assert!(state.is_failed());
        assert!(matches!(
            state.error(),
            Some(FetchError::PartialJoin { part: "price history", .. })
        ));
    }

    #[tokio::test]
    async fn test_range_change_refetches_series() {
        let mock = Arc::new(MockProvider::new());
        mock.set_coin(Ok(coin_profile("eth")));
        mock.set_coin_chart(Ok(series(&[1.0])));
        let mut session = AppSession::new(client(&mock), Currency::Eur);

        session.open_coin("eth", TimeRange::Week).await;
        session.set_coin_range(TimeRange::Year).await;

        assert_eq!(
            mock.calls("coin_chart"),
            vec!["eth:eur:7".to_string(), "eth:eur:365".to_string()]
        );
        assert_eq!(session.detail().map(|d| d.range()), Some(TimeRange::Year));
    }

    #[tokio::test]
    async fn test_exchange_sort_resets_page() {
        let mock = Arc::new(MockProvider::new());
        mock.set_exchange_pages(vec![Ok(exchanges("x", 1, 60))]);
        let session = AppSession::new(client(&mock), Currency::Usd);
        let mut screen = session.exchanges();

        assert!(screen.load().await.is_ready());
        screen.set_page(3);
        assert_eq!(screen.page(), 3);
        let page = screen.visible();
        let page = page.ready().unwrap();
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.total_pages, 3);

        screen.next_page();
        assert_eq!(screen.page(), 3);

        screen.request_sort(SortKey::Volume24hBtc);
        assert_eq!(screen.page(), 1);
        screen.request_sort(SortKey::Volume24hBtc);
        assert_eq!(screen.sort().key, SortKey::Volume24hBtc);

        let page = screen.visible();
        let first = &page.ready().unwrap().rows[0];
        assert_eq!(first.id, "x-1");
    }

    #[tokio::test]
    async fn test_exchange_listing_shared_between_screens() {
        let mock = Arc::new(MockProvider::new());
        mock.set_exchange_pages(vec![Ok(vec![
            exchange("binance", Some(1), Some(150_000.0), Some(2017)),
            exchange("newdex", None, None, None),
        ])]);
        let session = AppSession::new(client(&mock), Currency::Usd);

        let first = session.exchanges();
        let second = session.exchanges();
        let (a, b) = tokio::join!(first.load(), second.load());

        assert!(a.is_ready() && b.is_ready());
        assert_eq!(mock.call_count("exchanges"), 1);
    }

    #[tokio::test]
    async fn test_overview_and_analytics_from_shared_stats() {
        let mock = Arc::new(MockProvider::new());
        mock.set_global(Ok(global_snapshot()));
        mock.set_global_chart(Ok(series(&[2.0e12, 2.5e12, 3.0e12])));
        let session = AppSession::new(client(&mock), Currency::Eur);

        let overview = session.overview().await;
        let overview = overview.ready().unwrap();
        assert_eq!(overview.total_market_cap, Some(2.3e12));
        assert_eq!(overview.total_volume, None);
        assert_eq!(overview.btc_dominance, Some(52.4));

        let analytics = session.analytics(2).await;
        let analytics = analytics.ready().unwrap();
        assert_eq!(analytics.series.len(), 2);
        assert_eq!(analytics.summary.map(|s| s.change_pct), Some(Some(50.0)));
        assert_eq!(mock.call_count("global"), 1);
    }
}
