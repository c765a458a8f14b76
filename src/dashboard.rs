use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::fetch::{self, cache::FetchCache, CONFIRMED_URL, DEATHS_URL};
use crate::process::{self, delta::daily_deltas, RawTable};
use crate::render::{build_chart, latest_metrics, Mode, Surface};

/// Countries preselected when the user names none explicitly.
pub const DEFAULT_COUNTRIES: &[&str] = &["US", "India", "United Kingdom"];

/// The two CSV endpoints a pass reads from. Defaults to the JHU feeds;
/// tests point these at a local server.
pub struct Sources {
    pub confirmed_url: String,
    pub deaths_url: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            confirmed_url: CONFIRMED_URL.to_string(),
            deaths_url: DEATHS_URL.to_string(),
        }
    }
}

/// What the user asked to see.
pub struct Selection {
    pub countries: Vec<String>,
    pub mode: Mode,
}

/// One full dashboard pass: fetch-or-cache both tables, reshape, derive
/// deltas, validate the selection, filter, and hand charts plus metric cards
/// to the surface. Fetch and parse failures are reported on the surface and
/// halt the pass without rendering anything; they are not returned as errors.
pub async fn run(
    client: &Client,
    cache: &FetchCache,
    sources: &Sources,
    selection: &Selection,
    surface: &mut dyn Surface,
) -> Result<()> {
    let (confirmed, deaths) = match fetch_both(client, cache, sources).await {
        Ok(pair) => pair,
        Err(err) => {
            error!("data load failed: {:#}", err);
            surface.error(&format!("Failed to fetch data: {:#}", err));
            return Ok(());
        }
    };

    let reshaped = process::reshape(&confirmed)
        .and_then(|c| process::reshape(&deaths).map(|d| (c, d)));
    let ((confirmed_rows, countries), (death_rows, _)) = match reshaped {
        Ok(pair) => pair,
        Err(err) => {
            error!("reshape failed: {:#}", err);
            surface.error(&format!("Failed to process data: {:#}", err));
            return Ok(());
        }
    };

    let confirmed_daily = daily_deltas(&confirmed_rows);
    let death_daily = daily_deltas(&death_rows);

    if selection.countries.is_empty() {
        surface.warning("Select at least one country to visualize data.");
        return Ok(());
    }

    let (known, unknown): (Vec<String>, Vec<String>) = selection
        .countries
        .iter()
        .cloned()
        .partition(|c| countries.binary_search(c).is_ok());
    for country in &unknown {
        warn!(country = %country, "not present in source data");
        surface.warning(&format!("No data for `{}`; skipping.", country));
    }
    if known.is_empty() {
        surface.warning("None of the selected countries appear in the source data.");
        return Ok(());
    }

    surface.line_chart(&build_chart(
        "Cases Over Time",
        "cases",
        &confirmed_daily,
        &known,
        selection.mode,
    ))?;
    surface.line_chart(&build_chart(
        "Deaths Over Time",
        "deaths",
        &death_daily,
        &known,
        selection.mode,
    ))?;

    for metric in latest_metrics(&confirmed_daily, &death_daily, &known) {
        surface.metric(&metric)?;
    }

    info!(
        countries = known.len(),
        mode = selection.mode.as_str(),
        "rendered dashboard"
    );
    Ok(())
}

/// Country names available in the confirmed-cases table, sorted.
pub async fn list_countries(
    client: &Client,
    cache: &FetchCache,
    sources: &Sources,
) -> Result<Vec<String>> {
    let confirmed = fetch::fetch_table_cached(client, cache, &sources.confirmed_url).await?;
    let (_, countries) = process::reshape(&confirmed)?;
    Ok(countries)
}

async fn fetch_both(
    client: &Client,
    cache: &FetchCache,
    sources: &Sources,
) -> Result<(Arc<RawTable>, Arc<RawTable>)> {
    let confirmed = fetch::fetch_table_cached(client, cache, &sources.confirmed_url).await?;
    let deaths = fetch::fetch_table_cached(client, cache, &sources.deaths_url).await?;
    Ok((confirmed, deaths))
}
