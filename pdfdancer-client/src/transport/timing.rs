//! Server timing headers (`X-Received-At`, `X-Generated-AT`).

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use tracing::debug;

/// Timestamp sent with every request, microsecond precision
pub(crate) fn request_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Parse an RFC 3339 server timestamp with 6 or 9 fractional digits
pub(crate) fn parse_server_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Log transit and processing time reported by the server
pub(crate) fn log_server_timing(headers: &HeaderMap, label: &str) {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let received_at = header("X-Received-At");
    let generated_at = header("X-Generated-AT");
    if received_at.is_none() && generated_at.is_none() {
        return;
    }

    let now = Utc::now();
    let received = received_at.and_then(parse_server_timestamp);
    let generated = generated_at.and_then(parse_server_timestamp);
    if (received_at.is_some() && received.is_none()) || (generated_at.is_some() && generated.is_none()) {
        debug!(request = %label, ?received_at, ?generated_at, "Unparseable server timing header");
        return;
    }

    let seconds = |from: DateTime<Utc>, to: DateTime<Utc>| (to - from).num_microseconds().unwrap_or(0) as f64 / 1e6;
    debug!(
        request = %label,
        since_received_secs = received.map(|at| seconds(at, now)),
        since_generated_secs = generated.map(|at| seconds(at, now)),
        processing_secs = received.zip(generated).map(|(r, g)| seconds(r, g)),
        "Server timing"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_request_timestamp_has_microseconds() {
        let at = Utc
            .with_ymd_and_hms(2025, 10, 24, 8, 49, 39)
            .unwrap()
            .with_nanosecond(161_945_000)
            .unwrap();
        assert_eq!(request_timestamp(at), "2025-10-24T08:49:39.161945Z");
    }

    #[test]
    fn test_parse_micro_and_nano_precision() {
        let micro = parse_server_timestamp("2025-10-24T08:49:39.161945Z").unwrap();
        assert_eq!(micro.nanosecond(), 161_945_000);

        let nano = parse_server_timestamp("2025-10-24T08:58:45.468131265Z").unwrap();
        assert_eq!(nano.nanosecond(), 468_131_265);

        assert!(parse_server_timestamp("yesterday").is_none());
    }
}
