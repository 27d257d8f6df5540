//! Numeric and date coercion. Every parser returns `None` instead of failing.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Strip `$`, `,` and whitespace, then parse as a finite decimal.
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Render with at least one fractional digit: `1200.0`, `1200.5`.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.1}")
    } else {
        format!("{amount}")
    }
}

/// Integer stratum. An integral decimal such as `3.0` is accepted.
pub fn parse_stratum(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    let x = trimmed.parse::<f64>().ok()?;
    if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{1,4})[/-]([0-9]{1,2})[/-]([0-9]{1,4})$").unwrap())
}

fn year_first_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2})$").unwrap())
}

/// Calendar date with day-first disambiguation.
///
/// A four-digit leading component is read as `YYYY/MM/DD`; otherwise the value
/// is `DD/MM/YYYY`. `/` and `-` are both accepted as separators.
pub fn parse_benefit_date(value: &str) -> Option<NaiveDate> {
    let caps = date_regex().captures(value.trim())?;
    let (a, b, c) = (&caps[1], &caps[2], &caps[3]);
    let (year, month, day) = if a.len() == 4 {
        (a, b, c)
    } else if c.len() == 4 {
        (c, b, a)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

pub fn format_benefit_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Textual `YYYY/MM/DD` → `DD/MM/YYYY`. Any other shape is returned unchanged.
pub fn reformat_benefit_date(value: &str) -> String {
    match year_first_regex().captures(value) {
        Some(caps) => format!("{}/{}/{}", &caps[3], &caps[2], &caps[1]),
        None => value.to_string(),
    }
}

/// Sort key for a rendered `DD/MM/YYYY` date; anything else sorts last.
pub fn sortable_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
}
