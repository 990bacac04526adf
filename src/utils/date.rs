// src/utils/date.rs

//! Date parsing and canonicalization.
//!
//! All stored dates use the canonical `YYYY-MM-DD` form. Source portals in
//! the DACH region mostly print `DD.MM.YYYY`.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;

/// Format a date in the canonical form.
pub fn canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a date string in either German or canonical form.
pub fn parse_source_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Find the first German-style date anywhere in a text blob.
pub fn find_date(text: &str) -> Option<NaiveDate> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").expect("valid regex"));

    let caps = pattern.captures(text)?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Canonical date `days` after `from`.
pub fn offset(from: NaiveDate, days: i64) -> String {
    canonical(from + Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_german() {
        assert_eq!(
            parse_source_date("07.08.2026"),
            NaiveDate::from_ymd_opt(2026, 8, 7)
        );
    }

    #[test]
    fn test_parse_canonical() {
        assert_eq!(
            parse_source_date("2026-08-07"),
            NaiveDate::from_ymd_opt(2026, 8, 7)
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_source_date("demnächst"), None);
    }

    #[test]
    fn test_find_date_in_text() {
        let found = find_date("Bekanntmachung vom 03.02.2026 (aktualisiert)");
        assert_eq!(found, NaiveDate::from_ymd_opt(2026, 2, 3));
    }

    #[test]
    fn test_find_date_rejects_impossible() {
        assert_eq!(find_date("am 45.13.2026"), None);
    }

    #[test]
    fn test_offset() {
        let base = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(offset(base, 21), "2026-08-28");
    }
}
