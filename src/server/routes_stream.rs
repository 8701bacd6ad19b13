//! Media delivery endpoints: chunked video streaming and thumbnails.
//!
//! The transfer itself runs on the blocking worker pool; the handler
//! resolves the byte window, writes the response headers, and wires a
//! bounded channel between the pool worker and the response body.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;

use ottstream_db::queries::{thumbnails, video_files, videos};

use crate::streaming::{estimate, resolve_range, ByteRange, FileSource, MediaSink};

use crate::server::auth::authenticate;
use crate::server::error::ApiError;
use crate::server::routes_videos::parse_video_id;
use crate::server::AppContext;

/// Chunks buffered between the pool worker and the response body.
const CHANNEL_DEPTH: usize = 8;

#[derive(Deserialize)]
pub struct StreamParams {
    /// Playback offset in seconds, converted to a byte offset from the
    /// file's average bitrate. Ignored when a Range header is present.
    pub start: Option<String>,
}

/// [`MediaSink`] writing into a bounded channel consumed by the HTTP
/// response body. A closed channel means the client went away.
struct ChannelSink {
    tx: tokio::sync::mpsc::Sender<Bytes>,
}

impl MediaSink for ChannelSink {
    fn write(&mut self, buf: &[u8]) -> usize {
        match self.tx.blocking_send(Bytes::copy_from_slice(buf)) {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}

/// `GET /api/videos/:id/stream` delivers the video's first stored
/// file, honoring `Range` requests and the `start` seconds parameter.
pub async fn stream_video(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<StreamParams>,
) -> Result<Response, ApiError> {
    authenticate(&ctx, &headers)?;
    let video_id = parse_video_id(&id)?;

    let (video, file) = {
        let conn = ctx
            .db
            .get()
            .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;

        let video = videos::get_video(&conn, video_id)?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;

        let file = video_files::list_for_video(&conn, video_id)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Video has no stored file"))?;

        (video, file)
    };

    let path = std::path::PathBuf::from(&file.file_path);
    let source = tokio::task::spawn_blocking(move || FileSource::open(&path))
        .await
        .map_err(|e| ApiError::internal(format!("join: {}", e)))?
        .map_err(|e| {
            tracing::error!(path = %file.file_path, "failed to open media file: {}", e);
            ApiError::internal("Media file unavailable")
        })?;

    let file_size = crate::streaming::ByteSource::len(&source);

    let range_header = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok());

    let mut range = resolve_range(range_header, file_size)
        .map_err(|_| ApiError::range_not_satisfiable())?;

    // The start parameter only applies to rangeless requests; a Range
    // header always wins.
    if range.is_none() {
        if let Some(start) = params.start.as_deref() {
            if let Some(offset) = estimate(start, file.bitrate_kbps) {
                if offset < file_size {
                    range = Some(ByteRange {
                        start: offset,
                        end: file_size - 1,
                    });
                } else {
                    debug!(offset, file_size, "start offset beyond file, serving from 0");
                }
            }
        }
    }

    // Any resolved window, whether from a Range header or a start=
    // estimate, is a partial response and carries Content-Range.
    let content_length = range.map(|r| r.len()).unwrap_or(file_size);

    let mut builder = Response::builder()
        .status(if range.is_some() {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        })
        .header(header::CONTENT_TYPE, video.mime_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, content_length);

    if let Some(r) = range {
        builder = builder.header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", r.start, r.end, file_size),
        );
    }

    let (tx, rx) = tokio::sync::mpsc::channel::<Bytes>(CHANNEL_DEPTH);

    let submitted = ctx.tasks.submit(move || {
        let mut source = source;
        let mut sink = ChannelSink { tx };
        match crate::streaming::send(&mut source, range, &mut sink) {
            Ok(report) => {
                debug!(bytes_sent = report.bytes_sent, outcome = ?report.outcome, "transfer finished");
            }
            Err(e) => {
                tracing::warn!("transfer aborted: {}", e);
            }
        }
    });

    if !submitted {
        return Err(ApiError::internal("Server is shutting down"));
    }

    let stream = ReceiverStream::new(rx).map(Ok::<_, std::convert::Infallible>);
    let body = Body::from_stream(stream);

    builder
        .body(body)
        .map_err(|e| ApiError::internal(format!("response build: {}", e)))
}

/// `GET /api/videos/:id/thumbnail` serves the generated thumbnail.
/// Unauthenticated so catalog pages can embed it directly.
pub async fn thumbnail(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let video_id = parse_video_id(&id)?;

    let thumb = {
        let conn = ctx
            .db
            .get()
            .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;
        thumbnails::get_for_video(&conn, video_id)?
            .ok_or_else(|| ApiError::not_found("No thumbnail for this video"))?
    };

    let bytes = tokio::fs::read(&thumb.file_path).await.map_err(|e| {
        tracing::warn!(path = %thumb.file_path, "thumbnail file missing: {}", e);
        ApiError::not_found("No thumbnail for this video")
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/jpeg")],
        bytes,
    )
        .into_response())
}
