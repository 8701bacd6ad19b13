//! Watch history queries.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use ottstream_common::{Error, Result, UserId, VideoId};

use crate::models::WatchHistory;

use super::parse_timestamp;

/// Insert or update the playback position for a user and video.
pub fn upsert(
    conn: &Connection,
    user_id: UserId,
    video_id: VideoId,
    last_position_sec: i64,
    completed: bool,
) -> Result<()> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO watch_history (id, user_id, video_id, last_position_sec, completed, updated_at)
         VALUES (:id, :user_id, :video_id, :position, :completed, :updated_at)
         ON CONFLICT(user_id, video_id) DO UPDATE SET
             last_position_sec = :position,
             completed = :completed,
             updated_at = :updated_at",
        rusqlite::named_params! {
            ":id": Uuid::new_v4().to_string(),
            ":user_id": user_id.to_string(),
            ":video_id": video_id.to_string(),
            ":position": last_position_sec,
            ":completed": completed,
            ":updated_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get the stored playback position for a user and video.
pub fn get(conn: &Connection, user_id: UserId, video_id: VideoId) -> Result<Option<WatchHistory>> {
    let row = conn
        .query_row(
            "SELECT last_position_sec, completed, updated_at
             FROM watch_history WHERE user_id = :user_id AND video_id = :video_id",
            rusqlite::named_params! {
                ":user_id": user_id.to_string(),
                ":video_id": video_id.to_string(),
            },
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            e => Err(Error::database(e.to_string())),
        })?;

    row.map(|(last_position_sec, completed, updated_at)| {
        Ok(WatchHistory {
            user_id,
            video_id,
            last_position_sec,
            completed: completed != 0,
            updated_at: parse_timestamp(&updated_at)?,
        })
    })
    .transpose()
}
