//! Playback progress endpoints.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use ottstream_db::queries::{videos, watch_history};

use crate::server::auth::authenticate;
use crate::server::error::ApiError;
use crate::server::routes_videos::parse_video_id;
use crate::server::AppContext;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub video_id: String,
    pub position_sec: i64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub video_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub video_id: String,
    pub position_sec: i64,
    pub completed: bool,
    pub updated_at: String,
}

/// `POST /api/users/me/progress` upserts the caller's playback
/// position for a video. Responds 204 on success.
pub async fn post_progress(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<ProgressRequest>,
) -> Result<StatusCode, ApiError> {
    let user = authenticate(&ctx, &headers)?;
    let video_id = parse_video_id(&req.video_id)?;

    if req.position_sec < 0 {
        return Err(ApiError::bad_request("Position cannot be negative"));
    }

    let conn = ctx
        .db
        .get()
        .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;

    videos::get_video(&conn, video_id)?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    watch_history::upsert(&conn, user.id, video_id, req.position_sec, req.completed)?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/users/me/history?videoId=...` returns the stored position for one
/// video. Responds 204 when the caller has no history for it.
pub async fn get_history(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Response, ApiError> {
    let user = authenticate(&ctx, &headers)?;
    let video_id = parse_video_id(&params.video_id)?;

    let conn = ctx
        .db
        .get()
        .map_err(|e| ApiError::internal(format!("db pool: {}", e)))?;

    match watch_history::get(&conn, user.id, video_id)? {
        Some(history) => Ok(Json(HistoryResponse {
            video_id: history.video_id.to_string(),
            position_sec: history.last_position_sec,
            completed: history.completed,
            updated_at: history.updated_at.to_rfc3339(),
        })
        .into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
