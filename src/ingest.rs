//! Video ingestion: import a media file into the library.
//!
//! Copies the source into the configured video directory under the new
//! video's id, records the metadata rows, and queues a thumbnail.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;

use ottstream_common::media::{is_video_file, mime_type_for_path};
use ottstream_db::models::Video;
use ottstream_db::pool::DbPool;
use ottstream_db::queries::{video_files, videos};

use crate::config::Config;
use crate::pool::TaskPool;
use crate::thumbs;

/// Average bitrate in kbps from size and duration. Zero when the
/// duration is unknown.
fn average_bitrate_kbps(file_size: u64, duration_sec: f64) -> i64 {
    if duration_sec <= 0.0 {
        return 0;
    }
    ((file_size as f64 * 8.0 / 1000.0) / duration_sec).round() as i64
}

/// Import `source` into the library and return the new video record.
pub fn add_video(
    config: &Config,
    db: &DbPool,
    source: &Path,
    title: &str,
    description: &str,
) -> Result<Video> {
    if !source.exists() {
        bail!("source file does not exist: {:?}", source);
    }
    if !is_video_file(source) {
        bail!("not a recognized video file: {:?}", source);
    }

    let file_size = std::fs::metadata(source)
        .with_context(|| format!("failed to stat {:?}", source))?
        .len();

    let duration_sec = if thumbs::tools_available() {
        match thumbs::probe_duration(source) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("probe failed, duration unknown: {}", e);
                0.0
            }
        }
    } else {
        tracing::warn!("ffprobe not found, duration unknown");
        0.0
    };

    let mime_type = mime_type_for_path(source);

    let conn = db.get().context("db pool")?;
    let video = videos::create_video(
        &conn,
        title,
        description,
        duration_sec.round() as i64,
        mime_type,
    )?;

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_lowercase();
    let dest = config.media.video_dir.join(format!("{}.{}", video.id, ext));

    std::fs::create_dir_all(&config.media.video_dir)
        .with_context(|| format!("failed to create {:?}", config.media.video_dir))?;
    std::fs::copy(source, &dest)
        .with_context(|| format!("failed to copy {:?} to {:?}", source, dest))?;

    video_files::create_video_file(
        &conn,
        video.id,
        &dest.to_string_lossy(),
        file_size as i64,
        average_bitrate_kbps(file_size, duration_sec),
        None,
    )?;
    drop(conn);

    tracing::info!(video_id = %video.id, path = %dest.display(), "video imported");

    if thumbs::tools_available() {
        let pool = Arc::new(TaskPool::new(1)?);
        let db = db.clone();
        let video_id = video.id;
        let thumb_dir = config.media.thumbnail_dir.clone();
        pool.submit(move || {
            if let Err(e) = thumbs::generate_and_record(&db, video_id, &dest, &thumb_dir) {
                tracing::warn!(%video_id, "thumbnail generation failed: {}", e);
            }
        });
        pool.wait_idle();
        pool.shutdown();
    }

    Ok(video)
}
