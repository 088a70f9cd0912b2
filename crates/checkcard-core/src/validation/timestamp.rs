//! ISO-8601 timestamp checks.

use jiff::{
    civil::{Date, DateTime},
    Timestamp,
};
use serde_json::Value;

/// Whether `text` is an ISO-8601 instant, civil date-time or plain date.
///
/// Accepted forms include `2025-01-15T10:30:00Z`,
/// `2025-01-15T10:30:00.123456+02:00`, `2025-01-15T10:30:00` and
/// `2025-01-15`.
pub fn is_iso8601(text: &str) -> bool {
    text.parse::<Timestamp>().is_ok()
        || text.parse::<DateTime>().is_ok()
        || text.parse::<Date>().is_ok()
}

/// Checks a timestamp field, returning the violation for `field` if any.
/// `null` is accepted here; presence is a lifecycle rule.
pub fn check_timestamp(value: &Value, field: &str) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if is_iso8601(text) => None,
        Value::String(_) => Some(format!(
            "{field} must be valid ISO-8601 timestamp (e.g., '2025-01-15T10:30:00Z')"
        )),
        _ => Some(format!("{field} must be a string (ISO-8601 format)")),
    }
}

/// Current time in RFC 3339 UTC form.
pub fn now_rfc3339() -> String {
    Timestamp::now().to_string()
}
