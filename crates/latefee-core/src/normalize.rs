//! # Currency & Date Normalization
//!
//! The reporting API is loose about value representation: currency
//! columns arrive as numbers, `"1234.56"`, or `"$1,234.56"`; dates
//! arrive as `YYYY-MM-DD`, `MM/DD/YYYY`, or ISO timestamps. Everything
//! here normalizes those into canonical numeric / `YYYY-MM-DD` forms.
//!
//! ## Failure behavior
//!
//! None of these functions error. Unparseable currency becomes `0.0`
//! and unparseable dates become `""` — callers treat the empty string
//! as "substitute the run's fallback date". Malformed input must never
//! fail a row (it only degrades it), so the lenient contract is part
//! of the design, not a shortcut.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Parse a currency-ish value to a float.
///
/// Strips thousands separators and a leading `$`, then parses.
/// Returns `0.0` for empty or unparseable input.
pub fn parse_currency(v: &str) -> f64 {
    let cleaned = v.replace(',', "");
    let cleaned = cleaned.trim().trim_start_matches('$').trim();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Normalize a date string to `YYYY-MM-DD`.
///
/// Accepts, in order of preference:
/// 1. anything already prefixed with `YYYY-MM-DD` (ISO timestamps
///    included) — the prefix is returned as-is;
/// 2. `M/D/YYYY` through `MM/DD/YYYY` — reformatted;
/// 3. a handful of common datetime spellings parsed via chrono.
///
/// Returns `""` when nothing matches.
pub fn to_ymd(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return String::new();
    }

    if let Some(prefix) = ymd_prefix(s) {
        return prefix.to_string();
    }

    if let Some(ymd) = mdy_to_ymd(s) {
        return ymd;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    for fmt in ["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.date().format("%Y-%m-%d").to_string();
        }
    }
    for fmt in ["%b %d, %Y", "%B %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.format("%Y-%m-%d").to_string();
        }
    }

    String::new()
}

/// Reformat any recognizable date string as `MM/DD/YYYY` for display.
/// Returns `""` when the input is not a recognizable date.
pub fn to_mmddyyyy(s: &str) -> String {
    let ymd = to_ymd(s);
    if ymd.len() < 10 {
        return String::new();
    }
    format!("{}/{}/{}", &ymd[5..7], &ymd[8..10], &ymd[0..4])
}

/// `MM/01/YYYY` for the month of a `YYYY-MM-DD` date, falling back to
/// the month of `today` when the input is malformed.
pub fn first_of_month_from_ymd(ymd: &str, today: NaiveDate) -> String {
    if ymd.len() >= 7 {
        let year = ymd[0..4].parse::<i32>();
        let month = ymd[5..7].parse::<u32>();
        if let (Ok(y), Ok(m)) = (year, month) {
            return format!("{m:02}/01/{y}");
        }
    }
    format!("{:02}/01/{}", today.month(), today.year())
}

/// Build the charge description: `"{prefix} - MM/01/YYYY"`.
///
/// The fee is a monthly-period charge, so the date component is always
/// pinned to the first day of the charge month.
pub fn late_fee_description(charge_ymd: &str, prefix: &str, today: NaiveDate) -> String {
    format!("{prefix} - {}", first_of_month_from_ymd(charge_ymd, today))
}

/// Convert a `"Last, First"` payer name to `"First Last"`.
///
/// Names without a comma pass through unchanged.
pub fn last_comma_first_to_first_last(name: &str) -> String {
    match name.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim())
            .trim()
            .to_string(),
        None => name.to_string(),
    }
}

/// RFC 3339 timestamp for `days` days before `now`. Used for the
/// transactional API's `LastUpdatedAtFrom` lookback filter.
pub fn iso_days_ago(days: i64, now: DateTime<Utc>) -> String {
    (now - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Return the `YYYY-MM-DD` prefix of `s` if it has one.
fn ymd_prefix(s: &str) -> Option<&str> {
    let b = s.as_bytes();
    if b.len() < 10 {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
    if digits(0..4) && b[4] == b'-' && digits(5..7) && b[7] == b'-' && digits(8..10) {
        Some(&s[..10])
    } else {
        None
    }
}

/// Reformat a full-string `M/D/YYYY` date as `YYYY-MM-DD`.
fn mdy_to_ymd(s: &str) -> Option<String> {
    let mut parts = s.split('/');
    let (m, d, y) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|c| c.is_ascii_digit());
    if !all_digits(m) || !all_digits(d) || !all_digits(y) {
        return None;
    }
    if m.len() > 2 || d.len() > 2 || y.len() != 4 {
        return None;
    }
    Some(format!("{y}-{m:0>2}-{d:0>2}"))
}
