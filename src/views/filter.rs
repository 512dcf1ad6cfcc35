//! Search filtering over coin listings

use crate::constants::SEARCH_PREVIEW_LEN;
use crate::types::MarketListing;

/// Rows of `listings` to display for a search `query`
///
/// An empty query yields the first rows of the listing in server order.
/// Otherwise every row whose name or symbol contains the query,
/// case-insensitively, is kept.
pub fn filter_listings<'a>(listings: &'a [MarketListing], query: &str) -> Vec<&'a MarketListing> {
    if query.is_empty() {
        return listings.iter().take(SEARCH_PREVIEW_LEN).collect();
    }

    let needle = query.to_lowercase();
    listings
        .iter()
        .filter(|row| {
            row.name.to_lowercase().contains(&needle) || row.symbol.to_lowercase().contains(&needle)
        })
        .collect()
}
