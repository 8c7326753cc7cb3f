

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};


pub const DEFAULT_LOG_DIRECTIVE: &str = "softdel=info";


/// Installs a stderr subscriber honouring `RUST_LOG`. Returns false when a
/// global subscriber was already set.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .is_ok()
}


#[inline]
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}


pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_timestamp_round_trip_keeps_nanos() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let value = timestamp(at);
        assert_eq!(value, json!("2024-05-01T10:00:00.123456789Z"));
        assert_eq!(parse_timestamp(&value), Some(at));
    }

    #[test]
    fn test_parse_timestamp_rejects_non_strings() {
        assert_eq!(parse_timestamp(&json!(null)), None);
        assert_eq!(parse_timestamp(&json!("not a date")), None);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        assert!(!init_tracing());
    }
}
