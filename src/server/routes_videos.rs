//! Video catalog endpoints: listing, search, and detail.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use ottstream_common::VideoId;
use ottstream_db::models::{Video, VideoFile};
use ottstream_db::queries::{thumbnails, video_files, videos};

use crate::server::auth::authenticate;
use crate::server::error::ApiError;
use crate::server::AppContext;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub query: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub duration_sec: i64,
    pub mime_type: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    pub videos: Vec<VideoSummary>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    pub file_size: i64,
    pub bitrate_kbps: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailResponse {
    #[serde(flatten)]
    pub summary: VideoSummary,
    pub files: Vec<FileInfo>,
    pub stream_url: String,
}

/// `GET /api/videos` serves the paginated catalog, optionally filtered by a
/// title substring.
pub async fn list_videos(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<VideoListResponse>, ApiError> {
    authenticate(&ctx, &headers)?;

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let conn = ctx
        .db
        .get()
        .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;

    let (rows, total) = match params.query.as_deref().filter(|q| !q.is_empty()) {
        Some(q) => videos::search_videos(&conn, q, page, page_size)?,
        None => videos::list_videos(&conn, page, page_size)?,
    };

    let mut summaries = Vec::with_capacity(rows.len());
    for video in rows {
        let has_thumb = thumbnails::get_for_video(&conn, video.id)?.is_some();
        summaries.push(summarize(video, has_thumb));
    }

    Ok(Json(VideoListResponse {
        videos: summaries,
        page,
        page_size,
        total,
    }))
}

/// `GET /api/videos/:id` serves full metadata including the stored files.
pub async fn video_detail(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<VideoDetailResponse>, ApiError> {
    authenticate(&ctx, &headers)?;

    let video_id = parse_video_id(&id)?;

    let conn = ctx
        .db
        .get()
        .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;

    let video = videos::get_video(&conn, video_id)?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let files = video_files::list_for_video(&conn, video_id)?;
    let has_thumb = thumbnails::get_for_video(&conn, video_id)?.is_some();

    Ok(Json(VideoDetailResponse {
        stream_url: format!("/api/videos/{}/stream", video_id),
        summary: summarize(video, has_thumb),
        files: files.into_iter().map(file_info).collect(),
    }))
}

pub(crate) fn parse_video_id(raw: &str) -> Result<VideoId, ApiError> {
    raw.parse::<VideoId>()
        .map_err(|_| ApiError::bad_request("Invalid video id"))
}

fn summarize(video: Video, has_thumb: bool) -> VideoSummary {
    let thumbnail_url = has_thumb.then(|| format!("/api/videos/{}/thumbnail", video.id));
    VideoSummary {
        id: video.id,
        title: video.title,
        description: video.description,
        duration_sec: video.duration_sec,
        mime_type: video.mime_type,
        created_at: video.created_at.to_rfc3339(),
        thumbnail_url,
    }
}

fn file_info(file: VideoFile) -> FileInfo {
    FileInfo {
        id: file.id.to_string(),
        file_size: file.file_size,
        bitrate_kbps: file.bitrate_kbps,
        resolution: file.resolution,
    }
}
