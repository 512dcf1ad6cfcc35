//! Column sorting for the exchange table

use crate::types::ExchangeListing;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sortable exchange columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Externally computed trust-score rank
    #[default]
    TrustScoreRank,
    /// 24h volume normalized to BTC
    Volume24hBtc,
    /// Year the exchange was founded
    YearEstablished,
}

impl SortKey {
    /// Value compared for a row; `None` when the field is missing
    pub fn value(&self, exchange: &ExchangeListing) -> Option<f64> {
        match self {
            SortKey::TrustScoreRank => exchange.trust_score_rank.map(f64::from),
            SortKey::Volume24hBtc => exchange.trade_volume_24h_btc_normalized,
            SortKey::YearEstablished => exchange.year_established.map(f64::from),
        }
    }

    /// Column header
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::TrustScoreRank => "Rank",
            SortKey::Volume24hBtc => "24h Volume (BTC)",
            SortKey::YearEstablished => "Established",
        }
    }

    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::TrustScoreRank,
            SortKey::Volume24hBtc,
            SortKey::YearEstablished,
        ]
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rank" | "trust_score_rank" => Ok(SortKey::TrustScoreRank),
            "volume" | "trade_volume_24h_btc_normalized" => Ok(SortKey::Volume24hBtc),
            "year" | "year_established" => Ok(SortKey::YearEstablished),
            other => Err(format!(
                "unknown sort key '{}' (expected rank, volume or year)",
                other
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header marker
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Config after the user selects `key`
    ///
    /// Selecting the active key flips the direction, any other key starts
    /// ascending.
    pub fn request(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.direction.reversed())
        } else {
            Self::new(key, SortDirection::Ascending)
        }
    }
}

impl fmt::Display for SortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key.label(), self.direction.arrow())
    }
}

/// Orders two optional keys; missing values always sort last
fn compare(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.total_cmp(&b),
            SortDirection::Descending => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Exchanges ordered by `config`
///
/// Rows missing the sort field trail in both directions. Rows with equal
/// keys have no guaranteed relative order.
pub fn sort_exchanges(rows: &[ExchangeListing], config: SortConfig) -> Vec<&ExchangeListing> {
    let mut sorted: Vec<&ExchangeListing> = rows.iter().collect();
    sorted.sort_by(|a, b| compare(config.key.value(a), config.key.value(b), config.direction));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::exchange;

    fn sample() -> Vec<ExchangeListing> {
        vec![
            exchange("kraken", Some(3), Some(12_000.0), Some(2011)),
            exchange("newdex", None, None, None),
            exchange("binance", Some(1), Some(150_000.0), Some(2017)),
            exchange("coinbase", Some(2), Some(40_000.0), Some(2012)),
            exchange("bitstamp", Some(5), None, Some(2014)),
            exchange("okx", Some(4), Some(60_000.0), None),
        ]
    }

    fn ids(rows: &[&ExchangeListing]) -> Vec<String> {
        rows.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_default_is_rank_ascending() {
        let rows = sample();
        let sorted = sort_exchanges(&rows, SortConfig::default());
        assert_eq!(
            ids(&sorted),
            vec!["binance", "coinbase", "kraken", "okx", "bitstamp", "newdex"]
        );
    }

    #[test]
    fn test_nulls_trail_in_both_directions() {
        let rows = sample();
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let sorted = sort_exchanges(&rows, SortConfig::new(SortKey::Volume24hBtc, direction));
            let tail: Vec<String> = ids(&sorted[4..]);
            assert!(tail.contains(&"newdex".to_string()));
            assert!(tail.contains(&"bitstamp".to_string()));
            assert!(sorted[..4].iter().all(|r| r.trade_volume_24h_btc_normalized.is_some()));
        }
    }

    #[test]
    fn test_opposite_direction_reverses_non_null_rows() {
        let rows = sample();
        for key in SortKey::all() {
            let asc = sort_exchanges(&rows, SortConfig::new(*key, SortDirection::Ascending));
            let desc = sort_exchanges(&rows, SortConfig::new(*key, SortDirection::Descending));

            let non_null = |sorted: &[&ExchangeListing]| -> Vec<String> {
                sorted
                    .iter()
                    .filter(|r| key.value(r).is_some())
                    .map(|r| r.id.clone())
                    .collect()
            };

            let mut reversed = non_null(&asc);
            reversed.reverse();
            assert_eq!(reversed, non_null(&desc), "key {:?}", key);

            let nulls = rows.iter().filter(|r| key.value(r).is_none()).count();
            for sorted in [&asc, &desc] {
                assert!(sorted[sorted.len() - nulls..]
                    .iter()
                    .all(|r| key.value(r).is_none()));
            }
        }
    }

    #[test]
    fn test_request_toggles_and_resets() {
        let config = SortConfig::default();

        let flipped = config.request(SortKey::TrustScoreRank);
        assert_eq!(flipped.direction, SortDirection::Descending);

        let back = flipped.request(SortKey::TrustScoreRank);
        assert_eq!(back.direction, SortDirection::Ascending);

        let other = flipped.request(SortKey::YearEstablished);
        assert_eq!(
            other,
            SortConfig::new(SortKey::YearEstablished, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("volume".parse::<SortKey>(), Ok(SortKey::Volume24hBtc));
        assert_eq!("Year".parse::<SortKey>(), Ok(SortKey::YearEstablished));
        assert!("country".parse::<SortKey>().is_err());
    }
}
