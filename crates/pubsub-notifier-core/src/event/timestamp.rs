//! Nanosecond timestamp rendering.

use chrono::{DateTime, Utc};

/// Render nanoseconds since the Unix epoch as an RFC3339 UTC string.
///
/// The fractional part keeps full nanosecond precision with trailing zeros
/// trimmed, and is omitted entirely for whole seconds
/// (`2023-11-14T22:13:20Z`, `2023-11-14T22:13:20.5Z`). Formatting does not
/// depend on the process locale or timezone.
pub fn format_timestamp(nanos: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp_nanos(nanos);
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let frac = dt.timestamp_subsec_nanos();
    if frac != 0 {
        let digits = format!("{frac:09}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out.push('Z');
    out
}
