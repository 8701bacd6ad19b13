//! Thumbnail queries.

use chrono::Utc;
use rusqlite::Connection;

use ottstream_common::{Error, Result, ThumbnailId, VideoId};

use crate::models::Thumbnail;

use super::{parse_timestamp, parse_uuid};

/// Record a generated thumbnail.
pub fn create_thumbnail(
    conn: &Connection,
    video_id: VideoId,
    file_path: &str,
    width: i64,
    height: i64,
) -> Result<Thumbnail> {
    let id = ThumbnailId::new();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO thumbnails (id, video_id, file_path, width, height, created_at)
         VALUES (:id, :video_id, :file_path, :width, :height, :created_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":video_id": video_id.to_string(),
            ":file_path": file_path,
            ":width": width,
            ":height": height,
            ":created_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Thumbnail {
        id,
        video_id,
        file_path: file_path.to_string(),
        width,
        height,
        created_at: now,
    })
}

/// Get the thumbnail for a video, if one has been generated.
pub fn get_for_video(conn: &Connection, video_id: VideoId) -> Result<Option<Thumbnail>> {
    let row = conn
        .query_row(
            "SELECT id, video_id, file_path, width, height, created_at
             FROM thumbnails WHERE video_id = :video_id ORDER BY created_at DESC LIMIT 1",
            rusqlite::named_params! { ":video_id": video_id.to_string() },
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            e => Err(Error::database(e.to_string())),
        })?;

    row.map(|(id, video_id, file_path, width, height, created_at)| {
        Ok(Thumbnail {
            id: ThumbnailId::from(parse_uuid(&id)?),
            video_id: VideoId::from(parse_uuid(&video_id)?),
            file_path,
            width,
            height,
            created_at: parse_timestamp(&created_at)?,
        })
    })
    .transpose()
}

/// Videos that do not have a thumbnail yet, paired with their first
/// stored file path. Videos without any file are skipped.
pub fn videos_without_thumbnail(conn: &Connection) -> Result<Vec<(VideoId, String)>> {
    let mut stmt = conn
        .prepare(
            "SELECT v.id,
                    (SELECT f.file_path FROM video_files f
                      WHERE f.video_id = v.id ORDER BY f.created_at, f.id LIMIT 1)
             FROM videos v
             WHERE NOT EXISTS (SELECT 1 FROM thumbnails t WHERE t.video_id = v.id)",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    rows.into_iter()
        .filter_map(|(id, path)| path.map(|p| (id, p)))
        .map(|(id, path)| Ok((VideoId::from(parse_uuid(&id)?), path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::queries::{video_files, videos};

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn create_and_get_thumbnail() {
        let conn = test_conn();
        let video = videos::create_video(&conn, "v", "", 0, "video/mp4").unwrap();
        create_thumbnail(&conn, video.id, "/thumbs/v.jpg", 320, 180).unwrap();

        let thumb = get_for_video(&conn, video.id).unwrap().unwrap();
        assert_eq!(thumb.file_path, "/thumbs/v.jpg");
        assert_eq!(thumb.width, 320);
    }

    #[test]
    fn missing_thumbnail_is_none() {
        let conn = test_conn();
        let video = videos::create_video(&conn, "v", "", 0, "video/mp4").unwrap();
        assert!(get_for_video(&conn, video.id).unwrap().is_none());
    }

    #[test]
    fn backfill_query_skips_covered_and_fileless_videos() {
        let conn = test_conn();

        let with_file = videos::create_video(&conn, "pending", "", 0, "video/mp4").unwrap();
        video_files::create_video_file(&conn, with_file.id, "/media/p.mp4", 10, 0, None).unwrap();

        let covered = videos::create_video(&conn, "covered", "", 0, "video/mp4").unwrap();
        video_files::create_video_file(&conn, covered.id, "/media/c.mp4", 10, 0, None).unwrap();
        create_thumbnail(&conn, covered.id, "/thumbs/c.jpg", 320, 180).unwrap();

        // No file rows at all: nothing to grab a frame from.
        videos::create_video(&conn, "fileless", "", 0, "video/mp4").unwrap();

        let pending = videos_without_thumbnail(&conn).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, with_file.id);
        assert_eq!(pending[0].1, "/media/p.mp4");
    }
}
