//! Session-wide shared market data
//!
//! Holds the two read-mostly datasets every view may need: the global
//! statistics and the full exchange listing. Each is fetched at most once
//! per session; concurrent first callers wait on the same request.

use crate::{
    error::FetchError,
    fetch::MarketDataClient,
    state::FetchState,
    types::{ExchangeListing, GlobalStats},
};
use std::sync::Arc;
use tokio::sync::OnceCell;

type Shared<T> = OnceCell<Result<Arc<T>, FetchError>>;

/// Shared-state provider owned by the session and handed to screens as `Arc`
pub struct SharedMarketData {
    client: MarketDataClient,
    global: Shared<GlobalStats>,
    exchanges: Shared<Vec<ExchangeListing>>,
}

impl SharedMarketData {
    pub fn new(client: MarketDataClient) -> Self {
        Self {
            client,
            global: OnceCell::new(),
            exchanges: OnceCell::new(),
        }
    }

    /// Global statistics, fetching them on first use
    ///
    /// A failed fetch is kept for the rest of the session as well.
    pub async fn global_stats(&self) -> Result<Arc<GlobalStats>, FetchError> {
        self.global
            .get_or_init(|| async {
                tracing::debug!("Loading shared global stats");
                self.client.fetch_global_stats().await.map(Arc::new)
            })
            .await
            .clone()
    }

    /// Full exchange listing, fetching it on first use
    pub async fn exchanges(&self) -> Result<Arc<Vec<ExchangeListing>>, FetchError> {
        self.exchanges
            .get_or_init(|| async {
                tracing::debug!("Loading shared exchange listing");
                self.client.fetch_exchange_listings().await.map(Arc::new)
            })
            .await
            .clone()
    }

    /// Loads both datasets concurrently
    pub async fn prefetch(&self) {
        let _ = futures::join!(self.global_stats(), self.exchanges());
    }

    /// Current state of the global statistics without triggering a fetch
    pub fn global_state(&self) -> FetchState<Arc<GlobalStats>> {
        peek(&self.global)
    }

    /// Current state of the exchange listing without triggering a fetch
    pub fn exchanges_state(&self) -> FetchState<Arc<Vec<ExchangeListing>>> {
        peek(&self.exchanges)
    }

    pub fn client(&self) -> &MarketDataClient {
        &self.client
    }
}

fn peek<T>(cell: &Shared<T>) -> FetchState<Arc<T>> {
    match cell.get() {
        None => FetchState::Pending,
        Some(result) => result.clone().into(),
    }
}
