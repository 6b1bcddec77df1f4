use anyhow::Result;
use chrono::NaiveDate;

use crate::domain::ChartError;

pub struct TimeUtils;

impl TimeUtils {
    /// Canonical date key format. Lexical order equals chronological order.
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";
    /// Compact form some data sources emit (e.g. `20240102`).
    pub const COMPACT_TIME_FORMAT: &str = "%Y%m%d";

    /// Normalizes `YYYY-MM-DD` or `YYYYMMDD` input into the canonical date key.
    pub fn normalize_date_key(input: &str) -> Result<String> {
        let date = Self::parse_date_key(input)?;
        Ok(Self::date_key(date))
    }

    pub fn parse_date_key(input: &str) -> Result<NaiveDate> {
        let trimmed = input.trim();
        let format = if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Self::COMPACT_TIME_FORMAT
        } else {
            Self::STANDARD_TIME_FORMAT
        };

        NaiveDate::parse_from_str(trimmed, format)
            .map_err(|_| ChartError::InvalidDate(input.to_string()).into())
    }

    pub fn date_key(date: NaiveDate) -> String {
        format!("{}", date.format(Self::STANDARD_TIME_FORMAT))
    }
}

pub fn format_duration(ms: i64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    let secs = ms / 1000;
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m", mins);
    }
    format!("{}h {}m", mins / 60, mins % 60)
}
