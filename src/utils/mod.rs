//! Shared parsing helpers

pub mod dates;

pub use dates::{days_between, days_to_years, parse_age_text, parse_date, parse_datetime};

/// Treat blank and literal "NULL" cells as missing
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| {
            !v.is_empty() && !v.eq_ignore_ascii_case("null") && !v.eq_ignore_ascii_case("nan")
        })
}
