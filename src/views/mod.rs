//! Derived view builders
//!
//! Pure, synchronous transforms over already-fetched collections. Nothing
//! here performs I/O or keeps hidden state.

pub mod filter;
pub mod format;
pub mod paginate;
pub mod series;
pub mod sort;

pub use filter::filter_listings;
pub use paginate::{Page, Paginator};
pub use series::{downsample, summarize, SeriesSummary};
pub use sort::{sort_exchanges, SortConfig, SortDirection, SortKey};
