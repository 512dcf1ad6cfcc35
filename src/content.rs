//! Static blog posts and feature list

use crate::error::FetchError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlogPost {
    pub id: u32,
    pub title: &'static str,
    /// Display date, e.g. "April 10, 2024"
    pub date: &'static str,
    pub excerpt: &'static str,
    pub content: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

/// Blog posts, newest first
pub const BLOG_POSTS: [BlogPost; 3] = [
    BlogPost {
        id: 1,
        title: "Understanding Cryptocurrency Market Trends",
        date: "April 10, 2024",
        excerpt: "Learn how to analyze and understand cryptocurrency market trends to make \
                  informed investment decisions using CryptoTrackr data.",
        content: "Detailed analysis often involves looking at moving averages, trading volume \
                  patterns, and key support/resistance levels. Tools within CryptoTrackr can \
                  help visualize this data effectively. Remember that past performance is not \
                  indicative of future results.",
    },
    BlogPost {
        id: 2,
        title: "The Future of Digital Currency & DeFi",
        date: "April 5, 2024",
        excerpt: "Exploring the potential impact of digital currencies and decentralized \
                  finance on the global financial system.",
        content: "Decentralized Finance (DeFi) aims to recreate traditional financial systems \
                  with blockchain technology, removing intermediaries. While promising, it also \
                  comes with risks related to smart contract security and regulation. \
                  CryptoTrackr helps you monitor the coins involved in this growing ecosystem.",
    },
    BlogPost {
        id: 3,
        title: "Crypto Investment Strategies for Beginners",
        date: "March 28, 2024",
        excerpt: "A comprehensive guide for beginners looking to start their cryptocurrency \
                  investment journey, leveraging tools like CryptoTrackr.",
        content: "Common beginner strategies include Dollar-Cost Averaging (DCA) and holding \
                  long-term (HODLing). It's crucial to research projects thoroughly (using \
                  resources like the detailed coin view on CryptoTrackr), understand market \
                  volatility, and only invest what you can afford to lose. Diversification can \
                  also mitigate risk.",
    },
];

pub const FEATURES: [Feature; 6] = [
    Feature {
        title: "Real-time Tracking",
        description: "View live price updates for hundreds of cryptocurrencies.",
    },
    Feature {
        title: "Top Coin Lists",
        description: "Browse top cryptocurrencies by market capitalization.",
    },
    Feature {
        title: "Detailed Coin View",
        description: "Dive deep into specific coins with detailed charts and market data.",
    },
    Feature {
        title: "Multi-Currency Support",
        description: "View prices and market data in USD, EUR, or GBP.",
    },
    Feature {
        title: "Global Market Overview",
        description: "Get a snapshot of the total crypto market cap, volume, and dominance.",
    },
    Feature {
        title: "Market Analytics",
        description: "Visualize historical market trends with interactive charts.",
    },
];

/// Looks up a post by id
pub fn find_post(id: u32) -> Result<&'static BlogPost, FetchError> {
    BLOG_POSTS
        .iter()
        .find(|post| post.id == id)
        .ok_or_else(|| FetchError::not_found("Blog post"))
}
