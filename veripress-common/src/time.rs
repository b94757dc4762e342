//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC timestamp as RFC 3339 text (the persisted format)
pub fn now_rfc3339() -> String {
    now().to_rfc3339()
}

/// Parse a date as published by upstream sources
///
/// Accepts RFC 3339 timestamps ("2024-05-01T12:00:00Z") and plain
/// calendar dates ("2024-05-01"). Returns None for anything else.
pub fn parse_loose_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_loose_date("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 5);
        assert_eq!(ts.day(), 1);
    }

    #[test]
    fn test_parse_plain_date() {
        let ts = parse_loose_date("2023-11-09").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-11-09T00:00:00+00:00");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_loose_date("").is_none());
        assert!(parse_loose_date("3 days ago").is_none());
        assert!(parse_loose_date("   ").is_none());
    }
}
