//! Error types for the market data client

use crate::types::Dataset;
use thiserror::Error;

/// Errors that can occur when calling the remote market data API
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configured base URL cannot be used for requests
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Requested identifier does not exist (HTTP 404 on an id-keyed endpoint)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider API error
    #[error("Provider API error: {0}")]
    ApiError(String),
}

/// Failure carried by a view's fetch state
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// Connectivity problem, server error or unreadable payload
    #[error("Failed to fetch {dataset} data")]
    Network { dataset: Dataset, detail: String },

    /// The API answered 429
    #[error("API rate limit exceeded. Please wait a moment.")]
    RateLimited { dataset: Dataset },

    /// The requested identifier does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// One of two concurrent sub-requests failed
    #[error("{part} request failed: {cause}")]
    PartialJoin {
        dataset: Dataset,
        part: &'static str,
        cause: Box<FetchError>,
    },
}

impl FetchError {
    /// Maps a provider error onto the view-level taxonomy
    pub fn from_provider(dataset: Dataset, err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimitExceeded => Self::RateLimited { dataset },
            ProviderError::NotFound(what) => Self::NotFound { what },
            other => Self::Network {
                dataset,
                detail: other.to_string(),
            },
        }
    }

    /// Creates a NotFound error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Wraps the failure of one leg of a joined fetch
    pub fn partial(dataset: Dataset, part: &'static str, cause: FetchError) -> Self {
        Self::PartialJoin {
            dataset,
            part,
            cause: Box::new(cause),
        }
    }

    /// True when the failure, or the failed leg of a join, was a 429
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::PartialJoin { cause, .. } => cause.is_rate_limited(),
            _ => false,
        }
    }

    /// Human-readable reason for display
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_reason_differs_from_generic() {
        let limited = FetchError::from_provider(Dataset::Markets, ProviderError::RateLimitExceeded);
        let generic = FetchError::from_provider(
            Dataset::Markets,
            ProviderError::ApiError("HTTP 503".to_string()),
        );

        assert!(limited.is_rate_limited());
        assert!(!generic.is_rate_limited());
        assert!(limited.reason().contains("rate limit"));
        assert_eq!(generic.reason(), "Failed to fetch cryptocurrency data");
    }

    #[test]
    fn test_partial_join_keeps_cause() {
        let cause = FetchError::RateLimited {
            dataset: Dataset::GlobalStats,
        };
        let err = FetchError::partial(Dataset::GlobalStats, "market cap chart", cause);

        assert!(err.is_rate_limited());
        assert!(err.reason().starts_with("market cap chart request failed"));
    }

    #[test]
    fn test_not_found_maps_through() {
        let err = FetchError::from_provider(
            Dataset::CoinDetail,
            ProviderError::NotFound("coin dogecoin2".to_string()),
        );
        assert_eq!(err, FetchError::not_found("coin dogecoin2"));
        assert_eq!(err.reason(), "coin dogecoin2 not found");
    }
}
