use chrono::NaiveDate;

use super::LongRow;

/// A long-table row augmented with the day-over-day difference. The first
/// date per country has no prior value and carries a delta of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRow {
    pub country: String,
    pub date: NaiveDate,
    pub cumulative: u64,
    pub delta: i64,
}

/// Compute per-country successive differences over `rows`, which must be
/// sorted by (country, date) ascending as produced by `reshape`. Negative
/// deltas from non-monotonic source data are propagated as-is.
pub fn daily_deltas(rows: &[LongRow]) -> Vec<DailyRow> {
    let mut out = Vec::with_capacity(rows.len());
    let mut prev: Option<(&str, u64)> = None;

    for row in rows {
        let delta = match prev {
            Some((country, value)) if country == row.country => {
                row.cumulative as i64 - value as i64
            }
            _ => 0,
        };
        prev = Some((row.country.as_str(), row.cumulative));
        out.push(DailyRow {
            country: row.country.clone(),
            date: row.date,
            cumulative: row.cumulative,
            delta,
        });
    }

    out
}
