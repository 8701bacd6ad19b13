//! Video metadata queries.

use chrono::Utc;
use rusqlite::Connection;

use ottstream_common::{Error, Result, VideoId};

use crate::models::Video;

use super::{parse_timestamp, parse_uuid};

type VideoRow = (String, String, String, i64, String, String, String);

const VIDEO_COLUMNS: &str = "id, title, description, duration_sec, mime_type, created_at, updated_at";

/// Create a new video record.
pub fn create_video(
    conn: &Connection,
    title: &str,
    description: &str,
    duration_sec: i64,
    mime_type: &str,
) -> Result<Video> {
    let id = VideoId::new();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO videos (id, title, description, duration_sec, mime_type, created_at, updated_at)
         VALUES (:id, :title, :description, :duration_sec, :mime_type, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":title": title,
            ":description": description,
            ":duration_sec": duration_sec,
            ":mime_type": mime_type,
            ":created_at": now.to_rfc3339(),
            ":updated_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Video {
        id,
        title: title.to_string(),
        description: description.to_string(),
        duration_sec,
        mime_type: mime_type.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a video by id.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Option<Video>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM videos WHERE id = :id", VIDEO_COLUMNS),
            rusqlite::named_params! { ":id": id.to_string() },
            map_video_row,
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            e => Err(Error::database(e.to_string())),
        })?;

    row.map(video_from_row).transpose()
}

/// List videos ordered by creation time, newest first.
///
/// Returns the requested page together with the total row count.
pub fn list_videos(conn: &Connection, page: i64, page_size: i64) -> Result<(Vec<Video>, i64)> {
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM videos ORDER BY created_at DESC, id LIMIT :limit OFFSET :offset",
            VIDEO_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(
            rusqlite::named_params! {
                ":limit": page_size,
                ":offset": (page - 1) * page_size,
            },
            map_video_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let videos = rows
        .into_iter()
        .map(video_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((videos, total))
}

/// Search videos by title, paginated.
pub fn search_videos(
    conn: &Connection,
    query: &str,
    page: i64,
    page_size: i64,
) -> Result<(Vec<Video>, i64)> {
    let pattern = format!("%{}%", query);

    let total: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM videos WHERE title LIKE :pattern",
            rusqlite::named_params! { ":pattern": pattern },
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM videos WHERE title LIKE :pattern
             ORDER BY created_at DESC, id LIMIT :limit OFFSET :offset",
            VIDEO_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(
            rusqlite::named_params! {
                ":pattern": pattern,
                ":limit": page_size,
                ":offset": (page - 1) * page_size,
            },
            map_video_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let videos = rows
        .into_iter()
        .map(video_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((videos, total))
}

fn map_video_row(row: &rusqlite::Row<'_>) -> std::result::Result<VideoRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn video_from_row(
    (id, title, description, duration_sec, mime_type, created_at, updated_at): VideoRow,
) -> Result<Video> {
    Ok(Video {
        id: VideoId::from(parse_uuid(&id)?),
        title,
        description,
        duration_sec,
        mime_type,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
