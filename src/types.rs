//! Types for the market data client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Display currencies supported by the views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// US Dollar
    #[default]
    Usd,
    /// Euro
    Eur,
    /// Pound Sterling
    Gbp,
}

impl Currency {
    /// Lowercase code used by the API (`vs_currency`, map keys)
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
        }
    }

    /// Currency sign used when formatting amounts
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    /// Get all supported currencies
    pub fn all() -> &'static [Currency] {
        &[Currency::Usd, Currency::Eur, Currency::Gbp]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_uppercase())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::all()
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported currency '{}' (expected usd, eur or gbp)", s))
    }
}

/// Time windows offered for a coin's price history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    /// Last 24 hours
    Day,
    /// Last 7 days
    #[default]
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    Quarter,
    /// Last 365 days
    Year,
}

impl TimeRange {
    /// Number of days requested from the API
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Day => 1,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
            TimeRange::Year => 365,
        }
    }

    /// Short label shown on range selectors
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
            TimeRange::Quarter => "90d",
            TimeRange::Year => "1y",
        }
    }

    /// Get all ranges in ascending order
    pub fn all() -> &'static [TimeRange] {
        &[
            TimeRange::Day,
            TimeRange::Week,
            TimeRange::Month,
            TimeRange::Quarter,
            TimeRange::Year,
        ]
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    /// Accepts either a day count ("30") or a label ("30d", "1y")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        TimeRange::all()
            .iter()
            .copied()
            .find(|r| r.label() == s || r.days().to_string() == s)
            .ok_or_else(|| format!("unsupported range '{}' (expected 1, 7, 30, 90 or 365)", s))
    }
}

/// Logical datasets, used for error messages and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// Top coins by market cap
    Markets,
    /// One coin with its price history
    CoinDetail,
    /// Aggregate snapshot with market cap history
    GlobalStats,
    /// Exchange rankings
    Exchanges,
}

impl Dataset {
    /// Stable identifier for logs and metrics
    pub fn key(&self) -> &'static str {
        match self {
            Dataset::Markets => "markets",
            Dataset::CoinDetail => "coin_detail",
            Dataset::GlobalStats => "global_stats",
            Dataset::Exchanges => "exchanges",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match self {
            Dataset::Markets | Dataset::CoinDetail => "cryptocurrency",
            Dataset::GlobalStats => "global",
            Dataset::Exchanges => "exchange",
        };
        f.write_str(noun)
    }
}

/// One row of the coin listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketListing {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

/// A (timestamp, value) sample of a time series
///
/// The API encodes samples as `[millis, value]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl<'de> Deserialize<'de> for PricePoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (millis, value) = <(f64, f64)>::deserialize(deserializer)?;
        let timestamp = DateTime::from_timestamp_millis(millis as i64).ok_or_else(|| {
            serde::de::Error::custom(format!("timestamp out of range: {}", millis))
        })?;
        Ok(Self { timestamp, value })
    }
}

/// Extended single-coin record, without price history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinProfile {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub market_cap_rank: Option<u32>,
    /// Keyed by lowercase currency code
    pub current_price: HashMap<String, f64>,
    pub market_cap: HashMap<String, f64>,
    pub total_volume: HashMap<String, f64>,
    pub price_change_24h: HashMap<String, f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
    /// `None` means uncapped
    pub max_supply: Option<f64>,
    pub description: Option<String>,
}

impl CoinProfile {
    pub fn price_in(&self, currency: Currency) -> Option<f64> {
        self.current_price.get(currency.code()).copied()
    }

    pub fn market_cap_in(&self, currency: Currency) -> Option<f64> {
        self.market_cap.get(currency.code()).copied()
    }

    pub fn volume_in(&self, currency: Currency) -> Option<f64> {
        self.total_volume.get(currency.code()).copied()
    }

    pub fn change_24h_in(&self, currency: Currency) -> Option<f64> {
        self.price_change_24h.get(currency.code()).copied()
    }
}

/// A coin profile joined with its price history for one range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinDetail {
    pub profile: CoinProfile,
    pub currency: Currency,
    pub range: TimeRange,
    pub prices: Vec<PricePoint>,
}

/// Aggregate market figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSnapshot {
    #[serde(default)]
    pub active_cryptocurrencies: u64,
    #[serde(default)]
    pub markets: u64,
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    /// Dominance per lowercase asset symbol
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}

impl GlobalSnapshot {
    pub fn total_market_cap_in(&self, currency: Currency) -> Option<f64> {
        self.total_market_cap.get(currency.code()).copied()
    }

    pub fn total_volume_in(&self, currency: Currency) -> Option<f64> {
        self.total_volume.get(currency.code()).copied()
    }

    /// Dominance percentage of one asset, by symbol
    pub fn dominance(&self, symbol: &str) -> Option<f64> {
        self.market_cap_percentage
            .get(&symbol.to_lowercase())
            .copied()
    }
}

/// Snapshot paired with the 90-day total market cap series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
    pub snapshot: GlobalSnapshot,
    pub market_cap_series: Vec<PricePoint>,
}

/// One row of the exchange rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub trust_score_rank: Option<u32>,
    /// 24h volume normalized to BTC
    #[serde(default)]
    pub trade_volume_24h_btc_normalized: Option<f64>,
    #[serde(default)]
    pub year_established: Option<i32>,
    #[serde(default)]
    pub country: Option<String>,
}
