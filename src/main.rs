use anyhow::{anyhow, Result};
use clap::Parser;
use covidboard::dashboard::{self, Selection, Sources, DEFAULT_COUNTRIES};
use covidboard::fetch::cache::FetchCache;
use covidboard::render::{term::TermSurface, Mode};
use reqwest::Client;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// COVID-19 time-series dashboard: cases and deaths by country.
#[derive(Parser)]
#[command(name = "covidboard", version)]
struct Args {
    /// Country to compare; repeat for several (defaults to US, India,
    /// United Kingdom).
    #[arg(short, long = "country")]
    countries: Vec<String>,

    /// Metric to plot: daily or cumulative.
    #[arg(short, long, default_value = "daily")]
    mode: String,

    /// Print the available country names and exit.
    #[arg(long)]
    list_countries: bool,

    /// Seconds a fetched table is served from cache before refetching.
    #[arg(long, default_value_t = 3600)]
    ttl_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) parse selection ──────────────────────────────────────────
    let args = Args::parse();
    let mode = Mode::from_str(&args.mode)
        .ok_or_else(|| anyhow!("unknown mode `{}` (expected daily or cumulative)", args.mode))?;

    let client = Client::new();
    let cache = FetchCache::new(Duration::from_secs(args.ttl_secs));
    let sources = Sources::default();

    if args.list_countries {
        for country in dashboard::list_countries(&client, &cache, &sources).await? {
            println!("{}", country);
        }
        return Ok(());
    }

    let countries = if args.countries.is_empty() {
        DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect()
    } else {
        args.countries
    };
    let selection = Selection { countries, mode };

    // ─── 3) run one dashboard pass ───────────────────────────────────
    let mut surface = TermSurface::new();
    dashboard::run(&client, &cache, &sources, &selection, &mut surface).await
}
