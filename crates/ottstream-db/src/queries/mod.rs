//! Database query operations, one module per table.

pub mod thumbnails;
pub mod users;
pub mod video_files;
pub mod videos;
pub mod watch_history;

use chrono::{DateTime, Utc};
use ottstream_common::{Error, Result};

/// Parse an RFC 3339 timestamp stored as TEXT.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Parse a UUID stored as TEXT.
pub(crate) fn parse_uuid(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw).map_err(|e| Error::database(format!("invalid uuid '{}': {}", raw, e)))
}
