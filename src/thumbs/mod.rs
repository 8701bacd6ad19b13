//! Thumbnail generation via ffmpeg/ffprobe.
//!
//! Thumbnails are grabbed a few seconds into the video (a tenth of the
//! duration, capped at 5 seconds) and scaled to 320 px wide. Generation
//! runs on the worker pool; failures are logged, never fatal.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

use ottstream_common::VideoId;
use ottstream_db::pool::DbPool;
use ottstream_db::queries::thumbnails;

/// Output width in pixels; height follows the source aspect ratio.
pub const THUMB_WIDTH: i64 = 320;
/// Nominal height recorded alongside, assuming 16:9.
pub const THUMB_HEIGHT: i64 = 180;

const MAX_GRAB_OFFSET_SEC: f64 = 5.0;

/// Check that both external tools are on the PATH.
pub fn tools_available() -> bool {
    which::which("ffmpeg").is_ok() && which::which("ffprobe").is_ok()
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a media file's duration in seconds.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .context("failed to run ffprobe")?;

    if !output.status.success() {
        bail!(
            "ffprobe failed for {:?}: {}",
            path,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let parsed: FfprobeOutput =
        serde_json::from_slice(&output.stdout).context("unparseable ffprobe output")?;

    parsed
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .with_context(|| format!("no duration in ffprobe output for {:?}", path))
}

/// Offset to grab the frame at.
fn grab_offset(duration_sec: f64) -> f64 {
    (duration_sec * 0.1).min(MAX_GRAB_OFFSET_SEC).max(0.0)
}

/// Extract a single scaled frame from `source` into `dest` (JPEG).
pub fn generate_thumbnail(source: &Path, dest: &Path, duration_sec: f64) -> Result<()> {
    let offset = grab_offset(duration_sec);

    let output = Command::new("ffmpeg")
        .args(["-y", "-ss", &format!("{:.2}", offset), "-i"])
        .arg(source)
        .args([
            "-vframes",
            "1",
            "-vf",
            &format!("scale={}:-1", THUMB_WIDTH),
        ])
        .arg(dest)
        .output()
        .context("failed to run ffmpeg")?;

    if !output.status.success() {
        bail!(
            "ffmpeg failed for {:?}: {}",
            source,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(())
}

/// Generate a thumbnail for `video_id` from `source` and record it.
///
/// The image lands at `<thumb_dir>/<video_id>.jpg`.
pub fn generate_and_record(
    db: &DbPool,
    video_id: VideoId,
    source: &Path,
    thumb_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(thumb_dir)
        .with_context(|| format!("failed to create {:?}", thumb_dir))?;

    let duration = probe_duration(source)?;
    let dest = thumb_dir.join(format!("{}.jpg", video_id));
    generate_thumbnail(source, &dest, duration)?;

    let conn = db.get().context("db pool")?;
    thumbnails::create_thumbnail(
        &conn,
        video_id,
        &dest.to_string_lossy(),
        THUMB_WIDTH,
        THUMB_HEIGHT,
    )?;

    tracing::info!(%video_id, path = %dest.display(), "thumbnail generated");
    Ok(())
}
