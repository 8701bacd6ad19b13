//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use ottstream_common::{ThumbnailId, UserId, VideoFileId, VideoId};
use serde::{Deserialize, Serialize};

/// User account model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub login_id: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Video metadata model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub duration_sec: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored media file belonging to a video.
///
/// A video may carry several files at different bitrates; the streaming
/// endpoint currently serves the first one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoFile {
    pub id: VideoFileId,
    pub video_id: VideoId,
    pub file_path: String,
    pub file_size: i64,
    pub bitrate_kbps: i64,
    pub resolution: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Generated thumbnail for a video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thumbnail {
    pub id: ThumbnailId,
    pub video_id: VideoId,
    pub file_path: String,
    pub width: i64,
    pub height: i64,
    pub created_at: DateTime<Utc>,
}

/// Per-user playback position for a video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchHistory {
    pub user_id: UserId,
    pub video_id: VideoId,
    pub last_position_sec: i64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}
