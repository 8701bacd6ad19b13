//! Video file queries.

use chrono::Utc;
use rusqlite::Connection;

use ottstream_common::{Error, Result, VideoFileId, VideoId};

use crate::models::VideoFile;

use super::{parse_timestamp, parse_uuid};

type FileRow = (String, String, String, i64, i64, Option<String>, String);

/// Record a stored media file for a video.
pub fn create_video_file(
    conn: &Connection,
    video_id: VideoId,
    file_path: &str,
    file_size: i64,
    bitrate_kbps: i64,
    resolution: Option<&str>,
) -> Result<VideoFile> {
    let id = VideoFileId::new();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO video_files (id, video_id, file_path, file_size, bitrate_kbps, resolution, created_at)
         VALUES (:id, :video_id, :file_path, :file_size, :bitrate_kbps, :resolution, :created_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":video_id": video_id.to_string(),
            ":file_path": file_path,
            ":file_size": file_size,
            ":bitrate_kbps": bitrate_kbps,
            ":resolution": resolution,
            ":created_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(VideoFile {
        id,
        video_id,
        file_path: file_path.to_string(),
        file_size,
        bitrate_kbps,
        resolution: resolution.map(str::to_string),
        created_at: now,
    })
}

/// List the files stored for a video, oldest first.
///
/// The streaming endpoint serves the first entry; smarter bitrate
/// selection would slot in here.
pub fn list_for_video(conn: &Connection, video_id: VideoId) -> Result<Vec<VideoFile>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, video_id, file_path, file_size, bitrate_kbps, resolution, created_at
             FROM video_files WHERE video_id = :video_id ORDER BY created_at, id",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(
            rusqlite::named_params! { ":video_id": video_id.to_string() },
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    rows.into_iter().map(file_from_row).collect()
}

fn file_from_row(
    (id, video_id, file_path, file_size, bitrate_kbps, resolution, created_at): FileRow,
) -> Result<VideoFile> {
    Ok(VideoFile {
        id: VideoFileId::from(parse_uuid(&id)?),
        video_id: VideoId::from(parse_uuid(&video_id)?),
        file_path,
        file_size,
        bitrate_kbps,
        resolution,
        created_at: parse_timestamp(&created_at)?,
    })
}
