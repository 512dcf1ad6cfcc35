//! Constants for the market data client
//!
//! Endpoint paths, page sizes and display thresholds live here. Only the
//! base URL and request timeout can be overridden at runtime (see `config`).

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Coin listings ordered by market cap
pub const COINGECKO_MARKETS_ENDPOINT: &[&str] = &["coins", "markets"];

/// Single coin detail, followed by the coin id
pub const COINGECKO_COINS_ENDPOINT: &[&str] = &["coins"];

/// Appended after the coin id for its price history
pub const COINGECKO_MARKET_CHART_SEGMENT: &str = "market_chart";

/// Aggregate market snapshot
pub const COINGECKO_GLOBAL_ENDPOINT: &[&str] = &["global"];

/// Aggregate market cap history
pub const COINGECKO_GLOBAL_CHART_ENDPOINT: &[&str] = &["global", "market_cap_chart"];

/// Exchange listings
pub const COINGECKO_EXCHANGES_ENDPOINT: &[&str] = &["exchanges"];

/// Ordering requested for coin listings
pub const MARKETS_ORDER: &str = "market_cap_desc";

/// Number of coins fetched for the listings view
pub const MARKETS_PER_PAGE: usize = 100;

/// Rows requested per exchange listings call
pub const EXCHANGES_PER_REQUEST: usize = 100;

/// Maximum number of exchange pages requested per session
pub const EXCHANGE_MAX_PAGES: usize = 3;

/// History window of the global market cap series (in days)
pub const GLOBAL_CHART_DAYS: u32 = 90;

/// Rows shown by the listings view when no search query is set
pub const SEARCH_PREVIEW_LEN: usize = 10;

/// Rows per page of the exchange table
pub const EXCHANGES_PER_PAGE: usize = 25;

/// Prices at or below this value are shown with extra fraction digits
pub const PRICE_PRECISION_THRESHOLD: f64 = 10.0;

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "cryptotrackr/0.1.0";
