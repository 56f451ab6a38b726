use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};
use weekboard_core::dates::parse_api_date;

/// Accepts `YYYY-MM-DD` or natural language ("today", "next friday", "3 days").
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    if let Ok(date) = parse_api_date(input) {
        return Ok(date);
    }

    parse_date_string(input, Local::now(), Dialect::Uk)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", input, e))
}
