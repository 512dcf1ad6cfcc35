//! # CryptoTrackr
//!
//! Market data client for cryptocurrency listings, coin details, exchange
//! rankings and global market statistics, backed by the CoinGecko API.
//!
//! ## Layers
//!
//! - [`fetch::MarketDataClient`] turns provider calls into four datasets:
//!   market listings, coin detail, global stats and exchange listings.
//! - [`state::ViewState`] holds one view's tri-state result and drops
//!   responses from superseded requests.
//! - [`views`] holds the pure filter, sort, pagination and formatting helpers.
//! - [`screens::AppSession`] ties it together: active currency, per-screen
//!   state and the session-wide [`store::SharedMarketData`].
//!
//! ## Usage
//!
//! ```no_run
//! use cryptotrackr::{AppSession, ClientConfig, Currency, MarketDataClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MarketDataClient::coingecko(&ClientConfig::from_env())?;
//! let mut session = AppSession::new(client, Currency::Usd);
//!
//! session.load_markets().await;
//! if let Some(table) = session.markets().visible().ready() {
//!     for coin in &table.rows {
//!         println!("{}: {:?}", coin.name, coin.current_price);
//!     }
//! }
//!
//! // Reloads every currency-dependent screen
//! session.set_currency(Currency::Eur).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod screens;
pub mod state;
pub mod store;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{FetchError, ProviderError};
pub use fetch::MarketDataClient;
pub use metrics::DatasetMetrics;
pub use screens::{AppSession, CoinDetailScreen, ExchangesScreen, MarketsScreen};
pub use state::{FetchState, ViewState};
pub use store::SharedMarketData;
pub use types::{
    CoinDetail, CoinProfile, Currency, Dataset, ExchangeListing, GlobalSnapshot, GlobalStats,
    MarketListing, PricePoint, TimeRange,
};
