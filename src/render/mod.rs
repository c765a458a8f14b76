use anyhow::Result;
use chrono::NaiveDate;

use crate::process::delta::DailyRow;

pub mod term;

/// Which value the charts plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Daily,
    Cumulative,
}

impl Mode {
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Daily => "Daily",
            Mode::Cumulative => "Cumulative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Mode::Daily),
            "cumulative" => Some(Mode::Cumulative),
            _ => None,
        }
    }
}

/// One country's time series within a chart.
#[derive(Debug, Clone)]
pub struct Series {
    pub country: String,
    pub points: Vec<(NaiveDate, i64)>,
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub y_label: String,
    pub mode: Mode,
    pub series: Vec<Series>,
}

/// Latest cumulative figures for one country's summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub country: String,
    pub cases: u64,
    pub deaths: u64,
}

/// The UI collaborator the dashboard hands its output to. Chart drawing and
/// metric cards are opaque to the pipeline; warnings and errors are surfaced
/// here instead of being propagated.
pub trait Surface {
    fn line_chart(&mut self, chart: &Chart) -> Result<()>;
    fn metric(&mut self, metric: &Metric) -> Result<()>;
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Filter `rows` to the selected countries and assemble one series per
/// country, in selection order. Point values are deltas in Daily mode and
/// cumulative counts in Cumulative mode.
pub fn build_chart(
    title: &str,
    y_label: &str,
    rows: &[DailyRow],
    countries: &[String],
    mode: Mode,
) -> Chart {
    let mut series = Vec::with_capacity(countries.len());
    for country in countries {
        let points: Vec<(NaiveDate, i64)> = rows
            .iter()
            .filter(|r| &r.country == country)
            .map(|r| {
                let value = match mode {
                    Mode::Daily => r.delta,
                    Mode::Cumulative => r.cumulative as i64,
                };
                (r.date, value)
            })
            .collect();
        if !points.is_empty() {
            series.push(Series {
                country: country.clone(),
                points,
            });
        }
    }

    Chart {
        title: title.to_string(),
        y_label: y_label.to_string(),
        mode,
        series,
    }
}

/// Most recent cumulative case and death count per selected country, in
/// selection order. A country absent from the case table is skipped; one
/// absent only from the death table reports zero deaths.
pub fn latest_metrics(cases: &[DailyRow], deaths: &[DailyRow], countries: &[String]) -> Vec<Metric> {
    countries
        .iter()
        .filter_map(|country| {
            let latest_cases = cases.iter().filter(|r| &r.country == country).last()?;
            let latest_deaths = deaths
                .iter()
                .filter(|r| &r.country == country)
                .last()
                .map(|r| r.cumulative)
                .unwrap_or(0);
            Some(Metric {
                country: country.clone(),
                cases: latest_cases.cumulative,
                deaths: latest_deaths,
            })
        })
        .collect()
}
