//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an ISO date (`2026-11-02`) as `Nov 2, 2026`.
///
/// Anything that is not an ISO date is passed through unchanged.
///
/// Usage in templates: `{{ date|human_date }}`
#[askama::filter_fn]
pub fn human_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_human_date(&value.to_string()))
}

fn format_human_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_or_else(|_| raw.to_string(), |d| d.format("%b %-d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_human_date() {
        assert_eq!(format_human_date("2026-11-02"), "Nov 2, 2026");
        assert_eq!(format_human_date("someday"), "someday");
    }
}
