//! Date, datetime and age-text parsing for the shelter exports
//!
//! The open-data API and the portal download disagree on formats, so every
//! parser here tries a list of known layouts in order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Days per year used for age arithmetic
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Days per month used when converting "N months" age text
pub const DAYS_PER_MONTH: f64 = DAYS_PER_YEAR / 12.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a datetime in any of the supported export layouts
///
/// Date-only values resolve to midnight. Returns `None` for blank or
/// unrecognised input.
#[must_use]
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_date(value).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parse a date, accepting a trailing time component which is discarded
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            // "2017-07-07T00:00:00.000" style values from the API
            let date_part = value.split(['T', ' ']).next()?;
            if date_part.len() == value.len() {
                return None;
            }
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        })
}

/// Drop seconds and sub-second precision
#[must_use]
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Parse free-text age such as "2 years", "1 month" or "3 weeks" into days
///
/// Negative, blank and "NULL" values yield `None`.
#[must_use]
pub fn parse_age_text(value: &str) -> Option<f64> {
    let mut parts = value.split_whitespace();
    let amount: f64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?.to_lowercase();
    if amount < 0.0 || parts.next().is_some() {
        return None;
    }

    let unit_days = match unit.trim_end_matches('s') {
        "year" => DAYS_PER_YEAR,
        "month" => DAYS_PER_MONTH,
        "week" => 7.0,
        "day" => 1.0,
        _ => return None,
    };

    Some(amount * unit_days)
}

/// Whole days between two instants, negative when `end` precedes `start`
#[must_use]
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_days()
}

/// Convert days to years rounded to one decimal place
#[must_use]
pub fn days_to_years(days: f64) -> f64 {
    (days / DAYS_PER_YEAR * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_datetime_layouts() {
        assert_eq!(
            parse_datetime("2014-04-02 15:55:00"),
            Some(dt(2014, 4, 2, 15, 55, 0))
        );
        assert_eq!(
            parse_datetime("2013-10-11T11:29:35.000"),
            Some(dt(2013, 10, 11, 11, 29, 35))
        );
        assert_eq!(
            parse_datetime("05/08/2019 06:20:00 PM"),
            Some(dt(2019, 5, 8, 18, 20, 0))
        );
        assert_eq!(
            parse_datetime("2019-05-08T18:20:00-05:00"),
            Some(dt(2019, 5, 8, 18, 20, 0))
        );
        assert_eq!(parse_datetime("07/07/2017"), Some(dt(2017, 7, 7, 0, 0, 0)));
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("   "), None);
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2019-13-45 10:00"), None);
    }

    #[test]
    fn test_parse_date_with_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2017, 7, 7);
        assert_eq!(parse_date("2017-07-07T00:00:00.000"), expected);
        assert_eq!(parse_date("07/07/2017"), expected);
        assert_eq!(parse_date("2017-07-07"), expected);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_truncate_to_minute() {
        let value = parse_datetime("2013-10-11T11:29:35.000").unwrap();
        assert_eq!(truncate_to_minute(value), dt(2013, 10, 11, 11, 29, 0));
    }

    #[test]
    fn test_parse_age_text() {
        assert_eq!(parse_age_text("2 years"), Some(2.0 * DAYS_PER_YEAR));
        assert_eq!(parse_age_text("1 year"), Some(DAYS_PER_YEAR));
        assert_eq!(parse_age_text("3 weeks"), Some(21.0));
        assert_eq!(parse_age_text("5 days"), Some(5.0));
        assert_eq!(parse_age_text("1 month"), Some(DAYS_PER_MONTH));
        assert_eq!(parse_age_text("NULL"), None);
        assert_eq!(parse_age_text("-1 years"), None);
        assert_eq!(parse_age_text(""), None);
    }

    #[test]
    fn test_days_to_years_rounding() {
        // 2014-04-02 15:55 to 2015-04-27 14:45 is 389 whole days
        let days = days_between(dt(2014, 4, 2, 15, 55, 0), dt(2015, 4, 27, 14, 45, 0));
        assert_eq!(days, 389);
        assert_eq!(days_to_years(days as f64), 1.1);
    }
}
