use anyhow::{Context, Result};
use reqwest::Client;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::process::{self, RawTable};
use self::cache::FetchCache;

pub mod cache;

/// JHU CSSE global time-series endpoints.
pub static CONFIRMED_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";
pub static DEATHS_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";

/// Download `url` and parse the body as a wide time-series CSV.
pub async fn fetch_table(client: &Client, url: &str) -> Result<RawTable> {
    let url = Url::parse(url).with_context(|| format!("parsing URL {}", url))?;
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    process::parse_wide_csv(Cursor::new(bytes)).with_context(|| format!("parsing CSV from {}", url))
}

/// Serve `url` from the cache while the entry is fresh, otherwise fetch and
/// memoize the parsed table.
pub async fn fetch_table_cached(
    client: &Client,
    cache: &FetchCache,
    url: &str,
) -> Result<Arc<RawTable>> {
    if let Some(table) = cache.get(url) {
        debug!(url, "serving from cache");
        return Ok(table);
    }

    info!(url, "fetching");
    let table = fetch_table(client, url).await?;
    Ok(cache.insert(url, table))
}
