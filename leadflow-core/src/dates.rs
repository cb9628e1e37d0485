//! Lenient parsing for dates coming from the browser client.
//!
//! The front end sends due dates either as a bare `YYYY-MM-DD` (date input)
//! or as a full RFC 3339 timestamp, and sends an empty string when the field
//! is cleared.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;
use crate::{DueDate, Timestamp};

/// Parse a due date. Blank input means "no due date".
pub fn parse_due_date(raw: &str) -> Result<Option<DueDate>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(ts.with_timezone(&Utc).date_naive()));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return Ok(Some(naive.date()));
    }

    Err(ValidationError::InvalidDate {
        field: "due_date".to_string(),
        value: trimmed.to_string(),
    })
}

/// Parse a timestamp field (`scheduled_at`, filters). Blank input means none.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<Option<Timestamp>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    // datetime-local inputs carry no offset; treat them as UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return Ok(Some(naive.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    Err(ValidationError::InvalidDate {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_date() {
        let parsed = parse_due_date("2024-03-15").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_rfc3339_date() {
        let parsed = parse_due_date("2024-03-15T10:30:00Z").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(parse_due_date("").unwrap(), None);
        assert_eq!(parse_due_date("   ").unwrap(), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_due_date("not-a-date").is_err());
        assert!(parse_due_date("2024-13-45").is_err());
        assert!(parse_due_date("31/12/2024").is_err());
    }

    #[test]
    fn test_timestamp_variants() {
        assert!(parse_timestamp("scheduled_at", "2024-03-15T10:30:00-03:00")
            .unwrap()
            .is_some());
        assert!(parse_timestamp("scheduled_at", "2024-03-15T10:30")
            .unwrap()
            .is_some());
        assert!(parse_timestamp("scheduled_at", "2024-03-15").unwrap().is_some());
        assert!(parse_timestamp("scheduled_at", "soon").is_err());
    }
}
