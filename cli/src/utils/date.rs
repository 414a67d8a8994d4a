use chrono::{NaiveDate, Utc};

use crate::models::DateRange;

/// Parse a YYYY-MM-DD date string.
pub fn parse_date(date_str: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{date_str}': {e}"))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn one_year_before(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(365)
}

/// The interactive default window: one year back from today, ending today.
pub fn default_range() -> DateRange {
    let end = today();
    DateRange::new(one_year_before(end), end)
}
