use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::error::RecordError;

/// Placeholder for any text field that resolved to nothing.
pub const SENTINEL: &str = "-";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UTC_PLUS_8_SECS: i32 = 8 * 3600;

/// The fixed civil-time offset every timestamp is rendered in (UTC+8).
pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(UTC_PLUS_8_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in the display offset.
pub fn now_in_display_offset() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&display_offset())
}

/// Current wall-clock time as unix seconds, used for request signing.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Format an instant as `YYYY-MM-DD HH:MM:SS` in the display offset.
pub fn format_instant(instant: &DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(&display_offset())
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Format unix seconds for display. Zero means "no timestamp" and renders as
/// the sentinel.
pub fn format_timestamp(timestamp: i64) -> Result<String, RecordError> {
    if timestamp == 0 {
        return Ok(SENTINEL.to_string());
    }

    let instant = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or(RecordError::TimestampOutOfRange(timestamp))?;
    Ok(format_instant(&instant.fixed_offset()))
}
