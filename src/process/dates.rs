use chrono::NaiveDate;

/// Fast parse of a `M/D/YY` column header (e.g. `"1/22/20"`) into a date.
/// Two-digit years are pinned to the 2000s; four-digit years are accepted
/// as-is. Returns `None` for anything else.
pub fn parse_mdy(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let mut parts = s.split('/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let year: i32 = match year_part.len() {
        2 => 2000 + year_part.parse::<i32>().ok()?,
        4 => year_part.parse().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_digit_year() {
        assert_eq!(parse_mdy("1/22/20"), NaiveDate::from_ymd_opt(2020, 1, 22));
        assert_eq!(parse_mdy("12/31/21"), NaiveDate::from_ymd_opt(2021, 12, 31));
    }

    #[test]
    fn parses_four_digit_year() {
        assert_eq!(parse_mdy("3/9/2023"), NaiveDate::from_ymd_opt(2023, 3, 9));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(parse_mdy(" 1/22/20 "), NaiveDate::from_ymd_opt(2020, 1, 22));
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_mdy("Lat"), None);
        assert_eq!(parse_mdy(""), None);
        assert_eq!(parse_mdy("1/22"), None);
        assert_eq!(parse_mdy("1/22/20/5"), None);
        assert_eq!(parse_mdy("1/22/202"), None);
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert_eq!(parse_mdy("13/1/20"), None);
        assert_eq!(parse_mdy("2/30/20"), None);
    }
}
