use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

pub mod dates;
pub mod delta;

/// Number of identifying columns leading every row:
/// `Province/State, Country/Region, Lat, Long`.
pub const ID_COLUMNS: usize = 4;

const COUNTRY_IDX: usize = 1;

#[derive(Debug, Clone)]
pub struct RawTable {
    /// Column names from the header row: the four identifying columns
    /// followed by one column per calendar date.
    pub headers: Vec<String>,
    /// Each data row, as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
}

/// One (country, date) observation of the long table, with the cumulative
/// count summed across that country's sub-national rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    pub country: String,
    pub date: NaiveDate,
    pub cumulative: u64,
}

/// Parse a wide time-series CSV into a `RawTable`, validating that the
/// header leads with the expected identifying columns.
pub fn parse_wide_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|s| s.to_string())
        .collect();

    if headers.len() <= ID_COLUMNS {
        bail!(
            "expected {} identifying columns plus at least one date column, got {} columns",
            ID_COLUMNS,
            headers.len()
        );
    }
    if headers[COUNTRY_IDX].trim() != "Country/Region" {
        bail!(
            "unexpected header layout: column {} is `{}`, expected `Country/Region`",
            COUNTRY_IDX,
            headers[COUNTRY_IDX]
        );
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    debug!(rows = rows.len(), columns = headers.len(), "parsed wide CSV");
    Ok(RawTable { headers, rows })
}

/// Melt the wide table into one row per (country, date), summing values
/// across sub-national rows that share a country. Returns the long rows
/// sorted ascending by (country, date), plus the sorted de-duplicated
/// list of country names.
pub fn reshape(raw: &RawTable) -> Result<(Vec<LongRow>, Vec<String>)> {
    let mut columns = Vec::with_capacity(raw.headers.len() - ID_COLUMNS);
    for header in &raw.headers[ID_COLUMNS..] {
        let date = dates::parse_mdy(header)
            .with_context(|| format!("malformed date header `{}`", header))?;
        columns.push(date);
    }

    let mut totals: BTreeMap<(String, NaiveDate), u64> = BTreeMap::new();
    for (idx, row) in raw.rows.iter().enumerate() {
        let country = row[COUNTRY_IDX].trim();
        for (date, cell) in columns.iter().zip(&row[ID_COLUMNS..]) {
            let value = parse_count(cell).with_context(|| {
                format!("bad count at record {} ({}), column {}", idx, country, date)
            })?;
            *totals.entry((country.to_string(), *date)).or_insert(0) += value;
        }
    }

    let mut countries: Vec<String> = Vec::new();
    for (country, _) in totals.keys() {
        if countries.last() != Some(country) {
            countries.push(country.clone());
        }
    }

    let rows = totals
        .into_iter()
        .map(|((country, date), cumulative)| LongRow {
            country,
            date,
            cumulative,
        })
        .collect();

    Ok((rows, countries))
}

/// Empty cells count as zero; anything else must be a non-negative integer.
fn parse_count(cell: &str) -> Result<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0);
    }
    cell.parse::<u64>()
        .with_context(|| format!("`{}` is not a count", cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,covidboard::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn testland_csv() -> &'static str {
        "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n\
         ,Testland,10.0,20.0,10,15\n"
    }

    #[test]
    fn parse_and_reshape_testland() -> Result<()> {
        init_test_logging();
        let raw = parse_wide_csv(Cursor::new(testland_csv()))?;
        assert_eq!(raw.headers.len(), 6);
        assert_eq!(raw.rows.len(), 1);

        let (rows, countries) = reshape(&raw)?;
        assert_eq!(countries, vec!["Testland"]);
        assert_eq!(
            rows,
            vec![
                LongRow {
                    country: "Testland".into(),
                    date: NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
                    cumulative: 10,
                },
                LongRow {
                    country: "Testland".into(),
                    date: NaiveDate::from_ymd_opt(2020, 1, 23).unwrap(),
                    cumulative: 15,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn sums_subnational_rows() -> Result<()> {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n\
                   New South Wales,Australia,-33.8,151.2,4,7\n\
                   Victoria,Australia,-37.8,144.9,1,2\n\
                   ,Testland,0,0,10,15\n";
        let raw = parse_wide_csv(Cursor::new(csv))?;
        let (rows, countries) = reshape(&raw)?;

        assert_eq!(countries, vec!["Australia", "Testland"]);
        let australia: Vec<u64> = rows
            .iter()
            .filter(|r| r.country == "Australia")
            .map(|r| r.cumulative)
            .collect();
        assert_eq!(australia, vec![5, 9]);
        Ok(())
    }

    #[test]
    fn one_row_per_country_per_date_column() -> Result<()> {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20\n\
                   A,Aland,0,0,1,2,3\n\
                   B,Aland,0,0,1,1,1\n\
                   ,Bland,0,0,5,5,5\n";
        let raw = parse_wide_csv(Cursor::new(csv))?;
        let (rows, countries) = reshape(&raw)?;

        let date_columns = raw.headers.len() - ID_COLUMNS;
        for country in &countries {
            let count = rows.iter().filter(|r| &r.country == country).count();
            assert_eq!(count, date_columns);
        }
        Ok(())
    }

    #[test]
    fn countries_sorted_and_deduplicated() -> Result<()> {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n\
                   ,Zed,0,0,1\n\
                   X,Alpha,0,0,1\n\
                   Y,Alpha,0,0,2\n";
        let raw = parse_wide_csv(Cursor::new(csv))?;
        let (_, countries) = reshape(&raw)?;
        assert_eq!(countries, vec!["Alpha", "Zed"]);
        Ok(())
    }

    #[test]
    fn empty_cells_count_as_zero() -> Result<()> {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n\
                   ,Testland,0,0,,15\n";
        let raw = parse_wide_csv(Cursor::new(csv))?;
        let (rows, _) = reshape(&raw)?;
        assert_eq!(rows[0].cumulative, 0);
        assert_eq!(rows[1].cumulative, 15);
        Ok(())
    }

    #[test]
    fn malformed_date_header_is_rejected() -> Result<()> {
        let csv = "Province/State,Country/Region,Lat,Long,notadate\n\
                   ,Testland,0,0,10\n";
        let raw = parse_wide_csv(Cursor::new(csv))?;
        let err = reshape(&raw).unwrap_err();
        assert!(format!("{:#}", err).contains("malformed date header"));
        Ok(())
    }

    #[test]
    fn non_numeric_cell_is_rejected() -> Result<()> {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n\
                   ,Testland,0,0,ten\n";
        let raw = parse_wide_csv(Cursor::new(csv))?;
        assert!(reshape(&raw).is_err());
        Ok(())
    }

    #[test]
    fn unexpected_header_layout_is_rejected() {
        let csv = "Region,Name,Lat,Long,1/22/20\n,Testland,0,0,10\n";
        assert!(parse_wide_csv(Cursor::new(csv)).is_err());

        let csv = "Province/State,Country/Region,Lat,Long\n,Testland,0,0\n";
        assert!(parse_wide_csv(Cursor::new(csv)).is_err());
    }
}
