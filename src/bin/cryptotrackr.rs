use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cryptotrackr::{
    content::{find_post, BLOG_POSTS, FEATURES},
    logging::{init_tracing, DEFAULT_FILTER},
    screens::{AppSession, MarketAnalytics, MarketOverview},
    views::{
        format::{
            format_axis, format_btc_volume, format_compact, format_count, format_max_supply,
            format_percent, format_price, format_supply, MISSING,
        },
        downsample, SortKey,
    },
    ClientConfig, Currency, FetchState, MarketDataClient, PricePoint, TimeRange,
};
use tabled::{settings::Style, Table, Tabled};

#[derive(Parser)]
#[command(name = "cryptotrackr")]
#[command(version, about = "Cryptocurrency market data in the terminal", long_about = None)]
struct Cli {
    /// Currency prices are shown in (usd, eur, gbp)
    #[arg(short, long, global = true, default_value = "usd")]
    currency: Currency,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Top coins by market cap
    Markets {
        /// Filter by name or symbol
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Detail and price chart of one coin
    Coin {
        /// Coin identifier, e.g. "bitcoin"
        id: String,
        /// Chart range (24h, 7d, 30d, 90d, 1y)
        #[arg(short, long, default_value = "7d")]
        range: TimeRange,
    },
    /// Global market overview
    Global,
    /// 90-day total market cap trend
    Analytics {
        /// Number of chart rows
        #[arg(long, default_value_t = 15)]
        points: usize,
    },
    /// Exchange rankings
    Exchanges {
        /// Sort column (rank, volume, year); repeat to flip direction
        #[arg(short, long = "sort")]
        sort: Vec<SortKey>,
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Blog posts, or one post by id
    Blog { id: Option<u32> },
    /// What CryptoTrackr offers
    Features,
}

#[derive(Tabled)]
struct CoinRow {
    #[tabled(rename = "#")]
    rank: String,
    #[tabled(rename = "Coin")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "24h")]
    change: String,
    #[tabled(rename = "Market Cap")]
    market_cap: String,
    #[tabled(rename = "Volume (24h)")]
    volume: String,
}

#[derive(Tabled)]
struct ExchangeRow {
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "Exchange")]
    name: String,
    #[tabled(rename = "Volume (24h)")]
    volume: String,
    #[tabled(rename = "Established")]
    year: String,
    #[tabled(rename = "Country")]
    country: String,
}

#[derive(Tabled)]
struct Field {
    #[tabled(rename = "Metric")]
    label: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn field(label: &'static str, value: String) -> Field {
    Field { label, value }
}

fn print_table<T: Tabled>(rows: impl IntoIterator<Item = T>) {
    println!("{}", Table::new(rows).with(Style::modern()));
}

/// Unwraps a settled state, turning failures into the user-facing message
fn settled<T>(state: FetchState<T>) -> Result<T> {
    match state {
        FetchState::Ready(value) => Ok(value),
        FetchState::Failed(err) => bail!("{}", err),
        FetchState::Pending => bail!("request did not complete"),
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| MISSING.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(DEFAULT_FILTER);
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    let client =
        MarketDataClient::coingecko(&config).context("Failed to build the HTTP client")?;
    let mut session = AppSession::new(client, cli.currency);

    match cli.command {
        Command::Markets { search } => markets(&mut session, search).await,
        Command::Coin { id, range } => coin(&mut session, &id, range).await,
        Command::Global => global(&session).await,
        Command::Analytics { points } => analytics(&session, points).await,
        Command::Exchanges { sort, page } => exchanges(&session, &sort, page).await,
        Command::Blog { id } => {
            blog(id);
            Ok(())
        }
        Command::Features => {
            for feature in FEATURES.iter() {
                println!("{}\n  {}\n", feature.title, feature.description);
            }
            Ok(())
        }
    }
}

async fn markets(session: &mut AppSession, search: String) -> Result<()> {
    session.markets_mut().set_search(search);
    session.load_markets().await;
    let table = settled(session.markets().visible())?;

    if table.rows.is_empty() {
        println!("No coins match \"{}\"", session.markets().search());
        return Ok(());
    }

    let currency = table.currency;
    print_table(table.rows.iter().map(|coin| CoinRow {
        rank: opt(coin.market_cap_rank),
        name: format!("{} ({})", coin.name, coin.symbol.to_uppercase()),
        price: coin
            .current_price
            .map(|p| format_price(p, currency))
            .unwrap_or_else(|| MISSING.to_string()),
        change: format_percent(coin.price_change_percentage_24h),
        market_cap: coin
            .market_cap
            .map(|v| format_compact(v, currency))
            .unwrap_or_else(|| MISSING.to_string()),
        volume: coin
            .total_volume
            .map(|v| format_compact(v, currency))
            .unwrap_or_else(|| MISSING.to_string()),
    }));
    Ok(())
}

async fn coin(session: &mut AppSession, id: &str, range: TimeRange) -> Result<()> {
    let screen = session.open_coin(id, range).await;
    let detail = settled(screen.state())?;
    let profile = &detail.profile;
    let currency = detail.currency;
    let money = |value: Option<f64>, compact: bool| match value {
        Some(v) if compact => format_compact(v, currency),
        Some(v) => format_price(v, currency),
        None => MISSING.to_string(),
    };

    println!("{} ({})\n", profile.name, profile.symbol.to_uppercase());
    print_table([
        field("Rank", opt(profile.market_cap_rank)),
        field("Price", money(profile.price_in(currency), false)),
        field("24h Change", format_percent(profile.change_24h_in(currency))),
        field("Market Cap", money(profile.market_cap_in(currency), true)),
        field("Volume (24h)", money(profile.volume_in(currency), true)),
        field(
            "Circulating Supply",
            format_supply(profile.circulating_supply, &profile.symbol),
        ),
        field(
            "Total Supply",
            format_supply(profile.total_supply, &profile.symbol),
        ),
        field(
            "Max Supply",
            format_max_supply(profile.max_supply, &profile.symbol),
        ),
    ]);

    println!("\nPrice ({})", detail.range.label());
    print_chart(&downsample(&detail.prices, 12), |v| format_price(v, currency));

    if let Some(description) = &profile.description {
        println!("\n{}", description);
    }
    Ok(())
}

async fn global(session: &AppSession) -> Result<()> {
    let overview: MarketOverview = settled(session.overview().await)?;
    let currency = overview.currency;
    let money = |value: Option<f64>| {
        value
            .map(|v| format_compact(v, currency))
            .unwrap_or_else(|| MISSING.to_string())
    };

    print_table([
        field("Total Market Cap", money(overview.total_market_cap)),
        field("24h Volume", money(overview.total_volume)),
        field("BTC Dominance", format_percent(overview.btc_dominance)),
        field("ETH Dominance", format_percent(overview.eth_dominance)),
        field("Market Cap 24h", format_percent(overview.market_cap_change_24h)),
        field(
            "Active Cryptocurrencies",
            format_count(Some(overview.active_cryptocurrencies)),
        ),
        field("Markets", format_count(Some(overview.markets))),
    ]);
    Ok(())
}

async fn analytics(session: &AppSession, points: usize) -> Result<()> {
    let analytics: MarketAnalytics = settled(session.analytics(points).await)?;

    if let Some(summary) = analytics.summary {
        print_table([
            field("Start", format_axis(summary.first.value)),
            field("Latest", format_axis(summary.last.value)),
            field("Low", format_axis(summary.min)),
            field("High", format_axis(summary.max)),
            field("Change", format_percent(summary.change_pct)),
        ]);
    }

    println!("\nTotal market cap (USD), last 90 days");
    print_chart(&analytics.series, format_axis);
    Ok(())
}

async fn exchanges(session: &AppSession, sort: &[SortKey], page: usize) -> Result<()> {
    let mut screen = session.exchanges();
    settled(screen.load().await)?;

    for key in sort {
        screen.request_sort(*key);
    }
    screen.set_page(page);
    let page = settled(screen.visible())?;

    print_table(page.rows.iter().map(|exchange| ExchangeRow {
        rank: opt(exchange.trust_score_rank),
        name: exchange.name.clone(),
        volume: format_btc_volume(exchange.trade_volume_24h_btc_normalized),
        year: opt(exchange.year_established),
        country: opt(exchange.country.as_deref()),
    }));
    println!(
        "Page {} of {} ({} exchanges), sorted by {}",
        page.page, page.total_pages, page.total_rows, page.sort
    );
    Ok(())
}

fn blog(id: Option<u32>) {
    let Some(id) = id else {
        for post in BLOG_POSTS.iter() {
            println!("[{}] {} ({})", post.id, post.title, post.date);
            println!("    {}\n", post.excerpt);
        }
        return;
    };

    match find_post(id) {
        Ok(post) => {
            println!("{}\nPublished on {}\n\n{}", post.title, post.date, post.content);
        }
        Err(err) => {
            println!("{}", err);
            println!("<- Back to blog list: cryptotrackr blog");
        }
    }
}

/// Horizontal bar chart, one row per point
fn print_chart(points: &[PricePoint], label: impl Fn(f64) -> String) {
    const WIDTH: f64 = 40.0;

    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        });
    let span = max - min;

    for point in points {
        let filled = if span > 0.0 {
            ((point.value - min) / span * WIDTH).round() as usize + 1
        } else {
            1
        };
        println!(
            "{}  {:<41} {}",
            point.timestamp.format("%Y-%m-%d %H:%M"),
            "█".repeat(filled),
            label(point.value)
        );
    }
}
